//! # Potts Core
//!
//! A Cellular Potts Model engine: cells are connected voxel sets on a 2D or
//! 3D lattice whose shapes evolve through single-voxel flips accepted by the
//! Metropolis rule.
//!
//! This crate contains:
//! - The identity and region lattice with a guard border
//! - Neighbor topology descriptors for planar and volumetric runs
//! - The local connectivity checker that keeps every cell in one piece
//! - Seven energy terms: adhesion, volume, surface, height, persistence,
//!   junction and substrate
//! - The seeded Monte Carlo stepper, plus step metrics and logging setup
//!
//! ## Example
//!
//! ```
//! use potts_core::{Potts, SimulationConfig};
//! use potts_data::Voxel;
//!
//! let mut config = SimulationConfig::default();
//! config.lattice.length = 10;
//! config.lattice.width = 10;
//! config.potts.seed = Some(42);
//!
//! let mut potts = Potts::new(&config).unwrap();
//! let id = potts.add_cell(1, &[Voxel::new(5, 5, 0)], &[]).unwrap();
//! let stats = potts.step();
//!
//! assert_eq!(stats.trials, 100);
//! assert!(potts.cell(id).is_some());
//! ```

/// Per-cell state and the dense cell arena
pub mod cell;
/// Configuration management for simulation parameters
pub mod config;
/// Local simple-connectivity test for voxel flips
pub mod connectivity;
/// Error types
pub mod error;
/// Energy terms and their per-cell configurations
pub mod hamiltonian;
/// Identity and region arrays
pub mod lattice;
/// Voxel sets with cached shape measures
pub mod location;
/// Step counters and structured logging
pub mod metrics;
/// The Monte Carlo stepper
pub mod potts;
/// Id-indexed tables
pub mod slots;
/// Face and Moore neighborhoods
pub mod topology;

pub use cell::{CellArena, PottsCell, Targets};
pub use config::SimulationConfig;
pub use error::{PottsError, Result};
pub use hamiltonian::{Hamiltonian, HamiltonianTerm, TrialView};
pub use lattice::Lattice;
pub use location::{PottsLocation, VoxelSet};
pub use metrics::{init_logging, StepStats, TrialOutcome};
pub use potts::{accepts, Potts};
pub use topology::Topology;
