//! Tight-junction energy between regions.
//!
//! Cells are registered with their junction lambdas so the parameter tables
//! are validated up front, but the term contributes no energy yet.

use super::volume::{resolve_lambdas, LambdaConfig};
use crate::cell::PottsCell;
use crate::config::SimulationConfig;
use crate::error::{PottsError, Result};
use crate::slots::Slots;
use potts_data::{Region, TermKind};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct JunctionHamiltonian {
    populations: BTreeMap<u32, LambdaConfig>,
    cells: Slots<LambdaConfig>,
}

impl JunctionHamiltonian {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        Ok(Self {
            populations: resolve_lambdas(TermKind::Junction, config, |p| &p.junction)?,
            cells: Slots::new(),
        })
    }

    pub fn register(&mut self, cell: &PottsCell) -> Result<()> {
        let config = self
            .populations
            .get(&cell.population())
            .ok_or(PottsError::UnknownPopulation(cell.population()))?;
        self.cells.insert(cell.id(), config.clone());
        Ok(())
    }

    pub fn deregister(&mut self, id: u32) {
        self.cells.remove(id);
    }

    #[must_use]
    pub fn lambda(&self, id: u32) -> Option<f64> {
        self.cells.get(id).map(|c| c.lambda)
    }

    pub fn delta(&self, _source: u32, _target: u32) -> f64 {
        0.0
    }

    pub fn delta_region(&self, _id: u32, _source: Region, _target: Region) -> f64 {
        0.0
    }
}
