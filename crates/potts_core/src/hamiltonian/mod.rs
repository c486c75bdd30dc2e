//! Energy functional driving flip acceptance.
//!
//! The functional is a sum of independent terms, each holding a per-cell
//! configuration table keyed by cell id. Terms are a closed set, so they are
//! dispatched through [`HamiltonianTerm`] rather than trait objects.
//!
//! Every term answers two queries for a flip at voxel `v`:
//!
//! - [`HamiltonianTerm::delta`]: `v` changes owner from `source` to `target`.
//! - [`HamiltonianTerm::delta_region`]: `v` stays with cell `id` but changes
//!   region.
//!
//! Medium (id 0) carries no energy in any term. Lookups of unregistered ids
//! produce NaN, which the stepper treats as a rejection.

pub mod adhesion;
pub mod height;
pub mod junction;
pub mod persistence;
pub mod substrate;
pub mod surface;
pub mod volume;

pub use adhesion::AdhesionHamiltonian;
pub use height::HeightHamiltonian;
pub use junction::JunctionHamiltonian;
pub use persistence::PersistenceHamiltonian;
pub use substrate::SubstrateHamiltonian;
pub use surface::SurfaceHamiltonian;
pub use volume::VolumeHamiltonian;

use crate::cell::{CellArena, PottsCell};
use crate::config::SimulationConfig;
use crate::error::{PottsError, Result};
use crate::lattice::Lattice;
use potts_data::{PopulationParameters, Region, RegionMap, TermKind, Voxel};
use std::collections::BTreeMap;

/// Read-only lattice state handed to every energy query.
#[derive(Clone, Copy)]
pub struct TrialView<'a> {
    pub lattice: &'a Lattice,
    pub cells: &'a CellArena,
}

impl<'a> TrialView<'a> {
    #[inline]
    #[must_use]
    pub fn cell(&self, id: u32) -> Option<&'a PottsCell> {
        self.cells.get(id)
    }
}

/// Quadratic penalty `lambda × (value − target + change)²`.
#[inline]
pub(crate) fn quadratic(lambda: f64, value: f64, target: f64, change: f64) -> f64 {
    let d = value - target + change;
    lambda * d * d
}

/// Resolves per-region values for every sub-region a population declares.
pub(crate) fn region_values(
    term: TermKind,
    pop: &PopulationParameters,
    values: &BTreeMap<Region, f64>,
    parameter: &str,
) -> Result<RegionMap<f64>> {
    let mut map = RegionMap::new();
    for region in pop.declared_regions() {
        match values.get(&region) {
            Some(v) => {
                map.insert(region, *v);
            }
            None if region.is_sub_region() => {
                return Err(PottsError::missing(
                    term,
                    format!("{parameter}.{region}"),
                    &pop.name,
                ));
            }
            None => {}
        }
    }
    Ok(map)
}

/// One active energy term.
#[derive(Debug, Clone)]
pub enum HamiltonianTerm {
    Adhesion(AdhesionHamiltonian),
    Volume(VolumeHamiltonian),
    Surface(SurfaceHamiltonian),
    Height(HeightHamiltonian),
    Persistence(PersistenceHamiltonian),
    Junction(JunctionHamiltonian),
    Substrate(SubstrateHamiltonian),
}

impl HamiltonianTerm {
    /// Builds a term, resolving its per-population tables.
    pub fn new(kind: TermKind, config: &SimulationConfig, lattice: &Lattice) -> Result<Self> {
        Ok(match kind {
            TermKind::Adhesion => Self::Adhesion(AdhesionHamiltonian::new(config)?),
            TermKind::Volume => Self::Volume(VolumeHamiltonian::new(config)?),
            TermKind::Surface => Self::Surface(SurfaceHamiltonian::new(config)?),
            TermKind::Height => Self::Height(HeightHamiltonian::new(config)?),
            TermKind::Persistence => Self::Persistence(PersistenceHamiltonian::new(config)?),
            TermKind::Junction => Self::Junction(JunctionHamiltonian::new(config)?),
            TermKind::Substrate => Self::Substrate(SubstrateHamiltonian::new(config, lattice)?),
        })
    }

    #[must_use]
    pub fn kind(&self) -> TermKind {
        match self {
            Self::Adhesion(_) => TermKind::Adhesion,
            Self::Volume(_) => TermKind::Volume,
            Self::Surface(_) => TermKind::Surface,
            Self::Height(_) => TermKind::Height,
            Self::Persistence(_) => TermKind::Persistence,
            Self::Junction(_) => TermKind::Junction,
            Self::Substrate(_) => TermKind::Substrate,
        }
    }

    pub fn register(&mut self, cell: &PottsCell) -> Result<()> {
        match self {
            Self::Adhesion(h) => h.register(cell),
            Self::Volume(h) => h.register(cell),
            Self::Surface(h) => h.register(cell),
            Self::Height(h) => h.register(cell),
            Self::Persistence(h) => h.register(cell),
            Self::Junction(h) => h.register(cell),
            Self::Substrate(h) => h.register(cell),
        }
    }

    pub fn deregister(&mut self, id: u32) {
        match self {
            Self::Adhesion(h) => h.deregister(id),
            Self::Volume(h) => h.deregister(id),
            Self::Surface(h) => h.deregister(id),
            Self::Height(h) => h.deregister(id),
            Self::Persistence(h) => h.deregister(id),
            Self::Junction(h) => h.deregister(id),
            Self::Substrate(h) => h.deregister(id),
        }
    }

    #[inline]
    pub fn delta(&mut self, view: &TrialView<'_>, source: u32, target: u32, v: Voxel) -> f64 {
        match self {
            Self::Adhesion(h) => h.delta(view, source, target, v),
            Self::Volume(h) => h.delta(view, source, target),
            Self::Surface(h) => h.delta(view, source, target, v),
            Self::Height(h) => h.delta(view, source, target, v),
            Self::Persistence(h) => h.delta(view, source, target, v),
            Self::Junction(h) => h.delta(source, target),
            Self::Substrate(h) => h.delta(source, target, v),
        }
    }

    #[inline]
    pub fn delta_region(
        &mut self,
        view: &TrialView<'_>,
        id: u32,
        source: Region,
        target: Region,
        v: Voxel,
    ) -> f64 {
        match self {
            Self::Adhesion(h) => h.delta_region(view, id, source, target, v),
            Self::Volume(h) => h.delta_region(view, id, source, target),
            Self::Surface(h) => h.delta_region(view, id, source, target, v),
            Self::Height(h) => h.delta_region(view, id, source, target, v),
            Self::Persistence(h) => h.delta_region(view, id, source, target, v),
            Self::Junction(h) => h.delta_region(id, source, target),
            Self::Substrate(_) => 0.0,
        }
    }
}

/// The active terms, in configured order.
#[derive(Debug, Clone, Default)]
pub struct Hamiltonian {
    terms: Vec<HamiltonianTerm>,
}

impl Hamiltonian {
    /// Builds every configured term. Fails on the first missing parameter.
    pub fn new(config: &SimulationConfig, lattice: &Lattice) -> Result<Self> {
        let terms = config
            .potts
            .terms
            .iter()
            .map(|&kind| HamiltonianTerm::new(kind, config, lattice))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { terms })
    }

    #[must_use]
    pub fn terms(&self) -> &[HamiltonianTerm] {
        &self.terms
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Registers `cell` with every term. On failure no term keeps the cell.
    pub fn register(&mut self, cell: &PottsCell) -> Result<()> {
        for i in 0..self.terms.len() {
            if let Err(err) = self.terms[i].register(cell) {
                for term in &mut self.terms[..i] {
                    term.deregister(cell.id());
                }
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn deregister(&mut self, id: u32) {
        for term in &mut self.terms {
            term.deregister(id);
        }
    }

    /// Total energy change for moving `v` from `source` to `target`.
    #[inline]
    pub fn delta(&mut self, view: &TrialView<'_>, source: u32, target: u32, v: Voxel) -> f64 {
        self.terms
            .iter_mut()
            .map(|t| t.delta(view, source, target, v))
            .sum()
    }

    /// Total energy change for moving `v` between regions of cell `id`.
    #[inline]
    pub fn delta_region(
        &mut self,
        view: &TrialView<'_>,
        id: u32,
        source: Region,
        target: Region,
        v: Voxel,
    ) -> f64 {
        self.terms
            .iter_mut()
            .map(|t| t.delta_region(view, id, source, target, v))
            .sum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::location::PottsLocation;

    /// Places cells on a lattice without going through the stepper.
    pub(crate) struct Fixture {
        pub lattice: Lattice,
        pub cells: CellArena,
    }

    impl Fixture {
        pub fn new(length: usize, width: usize, height: usize) -> Self {
            Self {
                lattice: Lattice::new(length, width, height),
                cells: CellArena::new(),
            }
        }

        /// Places a cell; `regions` lists `(voxel, region)` overrides.
        pub fn place(
            &mut self,
            population: u32,
            regions: &[Region],
            voxels: &[(i32, i32, i32)],
            overrides: &[((i32, i32, i32), Region)],
        ) -> u32 {
            let id = self.cells.allocate();
            let mut loc = PottsLocation::new(self.lattice.topology(), regions);
            for &(x, y, z) in voxels {
                let v = Voxel::new(x, y, z);
                let region = overrides
                    .iter()
                    .find(|(o, _)| *o == (x, y, z))
                    .map_or(Region::Default, |(_, r)| *r);
                self.lattice.set_id(v, id);
                if regions.is_empty() {
                    loc.add(v);
                } else {
                    self.lattice.set_region(v, region);
                    loc.add_to(region, v);
                }
            }
            self.cells.insert(PottsCell::new(id, population, loc));
            id
        }

        pub fn view(&self) -> TrialView<'_> {
            TrialView {
                lattice: &self.lattice,
                cells: &self.cells,
            }
        }

        pub fn cell_mut(&mut self, id: u32) -> &mut PottsCell {
            self.cells.get_mut(id).unwrap()
        }
    }

    pub(crate) fn population(name: &str, code: u32) -> PopulationParameters {
        PopulationParameters::new(name, code)
    }

    #[test]
    fn test_quadratic() {
        assert_eq!(quadratic(2.0, 10.0, 8.0, 1.0), 18.0);
        assert_eq!(quadratic(1.0, 4.0, 4.0, 0.0), 0.0);
    }

    #[test]
    fn test_region_values_requires_sub_regions() {
        let mut pop = population("a", 1);
        pop.regions = vec![Region::Nucleus];
        let mut values = BTreeMap::new();
        assert!(region_values(TermKind::Volume, &pop, &values, "lambda").is_err());
        values.insert(Region::Nucleus, 2.0);
        let map = region_values(TermKind::Volume, &pop, &values, "lambda").unwrap();
        assert_eq!(map.get(Region::Nucleus), Some(&2.0));
        assert_eq!(map.get(Region::Default), None);
    }

    #[test]
    fn test_hamiltonian_fails_fast_on_missing_lambda() {
        let mut config = SimulationConfig::default();
        config.potts.terms = vec![TermKind::Volume];
        config.populations[0].volume.lambda = None;
        let lattice = Lattice::new(5, 5, 1);
        let err = Hamiltonian::new(&config, &lattice).unwrap_err();
        assert!(matches!(err, PottsError::MissingParameter { term: TermKind::Volume, .. }));
    }

    #[test]
    fn test_register_unknown_population_rolls_back() {
        let mut config = SimulationConfig::default();
        config.potts.terms = vec![TermKind::Volume, TermKind::Surface];
        let lattice = Lattice::new(5, 5, 1);
        let mut hamiltonian = Hamiltonian::new(&config, &lattice).unwrap();
        let mut fx = Fixture::new(5, 5, 1);
        let id = fx.place(9, &[], &[(2, 2, 0)], &[]);
        let cell = fx.cells.get(id).unwrap().clone();
        assert!(matches!(
            hamiltonian.register(&cell),
            Err(PottsError::UnknownPopulation(9))
        ));
        assert_eq!(hamiltonian.terms().len(), 2);
    }
}
