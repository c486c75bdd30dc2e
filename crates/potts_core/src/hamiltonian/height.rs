//! Quadratic penalty on the vertical extent of a cell at one footprint.
//!
//! Height is the z span of the owner's voxels in the column through the
//! flipped voxel, so a flip only ever changes the column it sits in.

use super::{quadratic, region_values, TrialView};
use crate::cell::PottsCell;
use crate::config::SimulationConfig;
use crate::error::{PottsError, Result};
use crate::location::VoxelSet;
use crate::slots::Slots;
use potts_data::{Region, RegionMap, TermKind, Voxel};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct HeightConfig {
    pub lambda: f64,
    pub critical: f64,
    pub region_lambdas: RegionMap<f64>,
    pub region_criticals: RegionMap<f64>,
}

/// Column span through `v` after adding (`+1`) or removing (`-1`) `v`.
fn column_span(set: &VoxelSet, v: Voxel, change: i32) -> f64 {
    let mut lo = i32::MAX;
    let mut hi = i32::MIN;
    let zs = set
        .column(v.x, v.y)
        .filter(|&z| !(change < 0 && z == v.z))
        .chain((change > 0).then_some(v.z));
    for z in zs {
        lo = lo.min(z);
        hi = hi.max(z);
    }
    if lo > hi {
        0.0
    } else {
        f64::from(hi - lo + 1)
    }
}

#[derive(Debug, Clone)]
pub struct HeightHamiltonian {
    populations: BTreeMap<u32, HeightConfig>,
    cells: Slots<HeightConfig>,
}

impl HeightHamiltonian {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let mut populations = BTreeMap::new();
        for pop in &config.populations {
            let term = TermKind::Height;
            let lambda = pop
                .height
                .lambda
                .ok_or_else(|| PottsError::missing(term, "lambda", &pop.name))?;
            let critical = pop
                .critical_height
                .ok_or_else(|| PottsError::missing(term, "critical_height", &pop.name))?;
            let region_lambdas = region_values(term, pop, &pop.height.regions, "lambda")?;
            let region_criticals = region_values(
                term,
                pop,
                &pop.critical_region_heights,
                "critical_region_heights",
            )?;
            populations.insert(
                pop.code,
                HeightConfig {
                    lambda,
                    critical,
                    region_lambdas,
                    region_criticals,
                },
            );
        }
        Ok(Self {
            populations,
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

    pub fn energy(&self, view: &TrialView<'_>, id: u32, v: Voxel, change: i32) -> f64 {
        if id == 0 {
            return 0.0;
        }
        match (view.cell(id), self.cells.get(id)) {
            (Some(cell), Some(config)) => {
                let span = column_span(cell.location().all(), v, change);
                quadratic(config.lambda, span, config.critical, 0.0)
            }
            _ => f64::NAN,
        }
    }

    pub fn region_energy(
        &self,
        view: &TrialView<'_>,
        id: u32,
        region: Region,
        v: Voxel,
        change: i32,
    ) -> f64 {
        if !region.is_sub_region() {
            return 0.0;
        }
        let (Some(cell), Some(config)) = (view.cell(id), self.cells.get(id)) else {
            return f64::NAN;
        };
        let (Some(set), Some(&lambda), Some(&critical)) = (
            cell.location().region(region),
            config.region_lambdas.get(region),
            config.region_criticals.get(region),
        ) else {
            return f64::NAN;
        };
        quadratic(lambda, column_span(set, v, change), critical, 0.0)
    }

    pub fn delta(&self, view: &TrialView<'_>, source: u32, target: u32, v: Voxel) -> f64 {
        let source_delta = self.energy(view, source, v, -1) - self.energy(view, source, v, 0);
        let target_delta = self.energy(view, target, v, 1) - self.energy(view, target, v, 0);
        source_delta + target_delta
    }

    pub fn delta_region(
        &self,
        view: &TrialView<'_>,
        id: u32,
        source: Region,
        target: Region,
        v: Voxel,
    ) -> f64 {
        let source_delta = self.region_energy(view, id, source, v, -1)
            - self.region_energy(view, id, source, v, 0);
        let target_delta = self.region_energy(view, id, target, v, 1)
            - self.region_energy(view, id, target, v, 0);
        source_delta + target_delta
    }
}
