//! Headless driver used by the command line binary.

use anyhow::{Context, Result};
use serde::Serialize;
use std::str::FromStr;

use crate::model::data::Voxel;
use crate::model::{Potts, SimulationConfig, StepStats};

/// A single-voxel cell to place before the run, written `population:x,y,z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCell {
    pub population: u32,
    pub voxel: Voxel,
}

impl FromStr for SeedCell {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (population, coords) = s
            .split_once(':')
            .with_context(|| format!("Expected population:x,y,z, got '{s}'"))?;
        let population = population
            .trim()
            .parse()
            .with_context(|| format!("Invalid population code in '{s}'"))?;
        let parts = coords
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid coordinates in '{s}'"))?;
        let [x, y, z] = parts[..] else {
            anyhow::bail!("Expected three coordinates in '{s}'");
        };
        Ok(Self {
            population,
            voxel: Voxel::new(x, y, z),
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CellSummary {
    pub id: u32,
    pub population: u32,
    pub volume: usize,
    pub surface: usize,
}

/// End-of-run report printed by the binary.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub fingerprint: String,
    pub digest: String,
    pub totals: StepStats,
    pub cells: Vec<CellSummary>,
    /// Ids of cells found in more than one piece.
    pub split_cells: Vec<u32>,
}

pub struct Runner {
    potts: Potts,
    fingerprint: String,
    totals: StepStats,
}

impl Runner {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        Ok(Self {
            potts: Potts::new(config)?,
            fingerprint: config.fingerprint(),
            totals: StepStats::default(),
        })
    }

    pub fn potts(&self) -> &Potts {
        &self.potts
    }

    pub fn potts_mut(&mut self) -> &mut Potts {
        &mut self.potts
    }

    /// Places every seed, returning the new cell ids in order.
    pub fn seed(&mut self, seeds: &[SeedCell]) -> Result<Vec<u32>> {
        let ids = seeds
            .iter()
            .map(|s| {
                self.potts
                    .add_cell(s.population, &[s.voxel], &[])
                    .with_context(|| format!("Failed to seed cell at {}", s.voxel))
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::info!(seeded = ids.len(), cells = self.potts.cells().len(), "Cells seeded");
        Ok(ids)
    }

    /// Runs `ticks` Monte Carlo steps and returns their combined counts.
    pub fn run(&mut self, ticks: u64) -> StepStats {
        let mut stats = StepStats::default();
        for _ in 0..ticks {
            stats += self.potts.step();
        }
        self.totals += stats;
        tracing::info!(
            ticks,
            accepted = stats.accepted,
            acceptance_rate = stats.acceptance_rate(),
            "Run finished"
        );
        stats
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.potts.tick(),
            fingerprint: self.fingerprint.clone(),
            digest: self.potts.lattice().digest(),
            totals: self.totals,
            cells: self
                .potts
                .cells()
                .iter()
                .map(|c| CellSummary {
                    id: c.id(),
                    population: c.population(),
                    volume: c.location().volume(),
                    surface: c.location().surface(),
                })
                .collect(),
            split_cells: self.potts.validate_connectivity(),
        }
    }
}
