//! Contact energy between unlike neighbors.
//!
//! The energy of a voxel owned by `id` is the mean over its Moore
//! neighborhood of the pairwise adhesion toward every neighbor with a
//! different owner. Medium has no coefficients of its own; a medium/cell
//! contact uses the cell's coefficient toward medium.

use super::TrialView;
use crate::config::SimulationConfig;
use crate::error::{PottsError, Result};
use crate::slots::Slots;
use crate::cell::PottsCell;
use potts_data::{PopulationParameters, Region, RegionMap, TermKind, Voxel};
use std::collections::BTreeMap;

/// Resolved coefficients for one population.
#[derive(Debug, Clone, PartialEq)]
pub struct AdhesionConfig {
    pub medium: f64,
    /// Keyed by population code.
    pub populations: BTreeMap<u32, f64>,
    /// `regions[a][b]`: coefficient of region `a` toward region `b`.
    pub regions: RegionMap<RegionMap<f64>>,
}

impl AdhesionConfig {
    fn resolve(pop: &PopulationParameters, all: &[PopulationParameters]) -> Result<Self> {
        let params = &pop.adhesion;
        let medium = params
            .medium
            .ok_or_else(|| PottsError::missing(TermKind::Adhesion, "medium", &pop.name))?;

        let mut populations = BTreeMap::new();
        for other in all {
            let value = params.populations.get(&other.name).ok_or_else(|| {
                PottsError::missing(TermKind::Adhesion, other.name.as_str(), &pop.name)
            })?;
            populations.insert(other.code, *value);
        }

        let declared = pop.declared_regions();
        let mut regions = RegionMap::new();
        for &a in &declared {
            let mut row = RegionMap::new();
            for &b in declared.iter().filter(|&&b| b != a) {
                let value = params
                    .regions
                    .get(&a)
                    .and_then(|r| r.get(&b))
                    .ok_or_else(|| {
                        PottsError::missing(TermKind::Adhesion, format!("regions.{a}.{b}"), &pop.name)
                    })?;
                row.insert(b, *value);
            }
            regions.insert(a, row);
        }

        Ok(Self {
            medium,
            populations,
            regions,
        })
    }

    #[inline]
    fn toward(&self, population: u32) -> f64 {
        self.populations.get(&population).copied().unwrap_or(f64::NAN)
    }

    #[inline]
    fn between(&self, from: Region, to: Region) -> f64 {
        self.regions
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone)]
pub struct AdhesionHamiltonian {
    populations: BTreeMap<u32, AdhesionConfig>,
    /// Population code per registered cell.
    cells: Slots<u32>,
}

impl AdhesionHamiltonian {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let populations = config
            .populations
            .iter()
            .map(|p| Ok((p.code, AdhesionConfig::resolve(p, &config.populations)?)))
            .collect::<Result<_>>()?;
        Ok(Self {
            populations,
            cells: Slots::new(),
        })
    }

    pub fn register(&mut self, cell: &PottsCell) -> Result<()> {
        if !self.populations.contains_key(&cell.population()) {
            return Err(PottsError::UnknownPopulation(cell.population()));
        }
        self.cells.insert(cell.id(), cell.population());
        Ok(())
    }

    pub fn deregister(&mut self, id: u32) {
        self.cells.remove(id);
    }

    fn config(&self, id: u32) -> Option<(u32, &AdhesionConfig)> {
        let code = *self.cells.get(id)?;
        self.populations.get(&code).map(|c| (code, c))
    }

    /// Pairwise coefficient between two distinct owners.
    fn pair(&self, a: u32, b: u32) -> f64 {
        match (a, b) {
            (0, 0) => 0.0,
            (0, b) => self.config(b).map_or(f64::NAN, |(_, c)| c.medium),
            (a, 0) => self.config(a).map_or(f64::NAN, |(_, c)| c.medium),
            (a, b) => match (self.config(a), self.config(b)) {
                (Some((pa, ca)), Some((pb, cb))) => (ca.toward(pb) + cb.toward(pa)) / 2.0,
                _ => f64::NAN,
            },
        }
    }

    /// Adhesion energy at `v` if it were owned by `id`.
    pub fn energy(&self, view: &TrialView<'_>, id: u32, v: Voxel) -> f64 {
        let topology = view.lattice.topology();
        let sum: f64 = topology
            .moore(v)
            .map(|n| view.lattice.id(n))
            .filter(|&other| other != id)
            .map(|other| self.pair(id, other))
            .sum();
        sum / topology.moore_count() as f64
    }

    /// Adhesion energy at `v` if it were region `region` of cell `id`.
    pub fn region_energy(&self, view: &TrialView<'_>, id: u32, region: Region, v: Voxel) -> f64 {
        let Some((_, config)) = self.config(id) else {
            return f64::NAN;
        };
        let topology = view.lattice.topology();
        let sum: f64 = topology
            .moore(v)
            .filter(|&n| view.lattice.id(n) == id)
            .map(|n| view.lattice.region(n))
            .filter(|&r| r != region && r.is_sub_region())
            .map(|r| (config.between(region, r) + config.between(r, region)) / 2.0)
            .sum();
        sum / topology.moore_count() as f64
    }

    pub fn delta(&self, view: &TrialView<'_>, source: u32, target: u32, v: Voxel) -> f64 {
        self.energy(view, target, v) - self.energy(view, source, v)
    }

    pub fn delta_region(
        &self,
        view: &TrialView<'_>,
        id: u32,
        source: Region,
        target: Region,
        v: Voxel,
    ) -> f64 {
        self.region_energy(view, id, target, v) - self.region_energy(view, id, source, v)
    }
}
