pub mod runner;

pub use runner::{CellSummary, RunSummary, Runner, SeedCell};
