//! Quadratic penalty on deviation from target volume.

use super::{quadratic, region_values, TrialView};
use crate::cell::PottsCell;
use crate::config::SimulationConfig;
use crate::error::{PottsError, Result};
use crate::slots::Slots;
use potts_data::{LambdaParameters, PopulationParameters, Region, RegionMap, TermKind};
use std::collections::BTreeMap;

/// Lambda multipliers for one population, shared by the surface term.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaConfig {
    pub lambda: f64,
    pub regions: RegionMap<f64>,
}

impl LambdaConfig {
    /// Lambda for a sub-region; NaN if the region was never resolved.
    #[inline]
    pub fn region(&self, region: Region) -> f64 {
        self.regions.get(region).copied().unwrap_or(f64::NAN)
    }
}

/// Resolves `lambda` plus sub-region lambdas of `term` for every population,
/// reading the table picked by `select`.
pub(crate) fn resolve_lambdas(
    term: TermKind,
    config: &SimulationConfig,
    select: fn(&PopulationParameters) -> &LambdaParameters,
) -> Result<BTreeMap<u32, LambdaConfig>> {
    config
        .populations
        .iter()
        .map(|pop| {
            let params = select(pop);
            let lambda = params
                .lambda
                .ok_or_else(|| PottsError::missing(term, "lambda", &pop.name))?;
            let regions = region_values(term, pop, &params.regions, "lambda")?;
            Ok((pop.code, LambdaConfig { lambda, regions }))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct VolumeHamiltonian {
    populations: BTreeMap<u32, LambdaConfig>,
    cells: Slots<LambdaConfig>,
}

impl VolumeHamiltonian {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        Ok(Self {
            populations: resolve_lambdas(TermKind::Volume, config, |p| &p.volume)?,
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

    /// Volume energy of cell `id` after a volume change of `change`.
    pub fn energy(&self, view: &TrialView<'_>, id: u32, change: i32) -> f64 {
        if id == 0 {
            return 0.0;
        }
        match (view.cell(id), self.cells.get(id)) {
            (Some(cell), Some(config)) => quadratic(
                config.lambda,
                cell.location().volume() as f64,
                cell.target_volume(),
                f64::from(change),
            ),
            _ => f64::NAN,
        }
    }

    /// Volume energy of `region` of cell `id`. The default region carries none.
    pub fn region_energy(&self, view: &TrialView<'_>, id: u32, region: Region, change: i32) -> f64 {
        if !region.is_sub_region() {
            return 0.0;
        }
        let (Some(cell), Some(config)) = (view.cell(id), self.cells.get(id)) else {
            return f64::NAN;
        };
        let Some(targets) = cell.region_targets(region) else {
            return f64::NAN;
        };
        quadratic(
            config.region(region),
            cell.location().region_volume(region) as f64,
            targets.volume,
            f64::from(change),
        )
    }

    pub fn delta(&self, view: &TrialView<'_>, source: u32, target: u32) -> f64 {
        let source_delta = self.energy(view, source, -1) - self.energy(view, source, 0);
        let target_delta = self.energy(view, target, 1) - self.energy(view, target, 0);
        source_delta + target_delta
    }

    pub fn delta_region(&self, view: &TrialView<'_>, id: u32, source: Region, target: Region) -> f64 {
        let source_delta =
            self.region_energy(view, id, source, -1) - self.region_energy(view, id, source, 0);
        let target_delta =
            self.region_energy(view, id, target, 1) - self.region_energy(view, id, target, 0);
        source_delta + target_delta
    }
}
