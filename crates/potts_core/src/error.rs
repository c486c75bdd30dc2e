//! Error types for the Potts engine.
//!
//! Every variant is a configuration-time failure: the trial loop itself never
//! produces errors.

use potts_data::{Region, TermKind, Voxel};
use thiserror::Error;

/// Main error type for engine construction and cell registration.
#[derive(Error, Debug)]
pub enum PottsError {
    /// A population or region lacks a parameter that an active term needs.
    #[error("Missing {term} parameter '{parameter}' for population '{population}'")]
    MissingParameter {
        term: TermKind,
        parameter: String,
        population: String,
    },

    /// No population with this code is configured.
    #[error("Unknown population code: {0}")]
    UnknownPopulation(u32),

    /// No live cell with this id.
    #[error("Unknown cell id: {0}")]
    UnknownCell(u32),

    /// Voxel out of bounds, on the guard border, or already occupied.
    #[error("Invalid voxel {voxel}: {reason}")]
    InvalidVoxel { voxel: Voxel, reason: String },

    /// Region not declared by the population.
    #[error("Invalid region '{region}' for population '{population}'")]
    InvalidRegion { region: Region, population: String },

    /// Configuration rejected before construction.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<PottsError>,
    },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, PottsError>;

impl PottsError {
    /// Creates a new missing parameter error.
    #[must_use]
    pub fn missing<P: Into<String>, S: Into<String>>(
        term: TermKind,
        parameter: P,
        population: S,
    ) -> Self {
        Self::MissingParameter {
            term,
            parameter: parameter.into(),
            population: population.into(),
        }
    }

    /// Creates a new invalid voxel error.
    #[must_use]
    pub fn invalid_voxel<S: Into<String>>(voxel: Voxel, reason: S) -> Self {
        Self::InvalidVoxel {
            voxel,
            reason: reason.into(),
        }
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
