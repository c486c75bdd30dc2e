//! Core data structures for the Potts simulation.

pub mod population;
pub mod region;
pub mod term;
pub mod voxel;
