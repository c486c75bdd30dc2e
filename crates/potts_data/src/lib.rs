//! Shared data types for the Potts lattice engine.
//!
//! Everything in this crate is plain data: coordinates, region tags, term
//! selectors and the per-population parameter tables read from configuration.

pub mod data;

pub use data::population::{
    AdhesionParameters, LambdaParameters, PersistenceParameters, PopulationParameters,
    SubstrateParameters,
};
pub use data::region::{ParseRegionError, Region, RegionMap};
pub use data::term::TermKind;
pub use data::voxel::Voxel;
