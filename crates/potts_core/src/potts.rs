//! The Monte Carlo stepper.
//!
//! One [`Potts::step`] runs a fixed number of flip trials. Each trial picks a
//! random interior voxel, proposes a new owner (or a new region within the
//! same owner) from its face neighbors, rejects proposals that would break a
//! cell apart, and applies the Metropolis rule to the summed energy change.
//!
//! Trials are strictly sequential and share one seeded RNG. Per trial the
//! RNG is consumed in a fixed order: `x`, `y`, `z` (volumetric runs only),
//! the candidate index (only when candidates exist), then the acceptance
//! draw (only once both connectivity checks pass). Two runs with the same
//! seed, configuration and placed cells therefore evolve identically.

use crate::cell::{CellArena, PottsCell};
use crate::config::SimulationConfig;
use crate::connectivity::is_connected;
use crate::error::{PottsError, Result};
use crate::hamiltonian::{Hamiltonian, TrialView};
use crate::lattice::Lattice;
use crate::location::PottsLocation;
use crate::metrics::{StepStats, TrialOutcome};
use crate::topology::Topology;
use potts_data::{PopulationParameters, Region, Voxel};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Distinct neighbor values in scan order. A voxel has at most six faces.
#[derive(Debug, Clone, Copy)]
struct Candidates<T> {
    items: [T; 6],
    len: usize,
}

impl<T: Copy + Default + PartialEq> Candidates<T> {
    fn new() -> Self {
        Self {
            items: [T::default(); 6],
            len: 0,
        }
    }

    fn push(&mut self, value: T) {
        if self.len < self.items.len() && !self.items[..self.len].contains(&value) {
            self.items[self.len] = value;
            self.len += 1;
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn get(&self, i: usize) -> T {
        self.items[i]
    }
}

/// Metropolis acceptance for an energy change `delta` against draw `r`.
///
/// Non-finite deltas are always rejected. Non-positive deltas are always
/// accepted. Otherwise the move is accepted when `r < exp(-delta / T)`.
#[must_use]
pub fn accepts(delta: f64, temperature: f64, r: f64) -> bool {
    if !delta.is_finite() {
        return false;
    }
    if delta <= 0.0 {
        return true;
    }
    r < (-delta / temperature).exp()
}

/// True if the cell, or one of its sub-regions, is in several pieces.
fn is_split(cell: &PottsCell) -> bool {
    let location = cell.location();
    !location.all().is_contiguous()
        || location
            .regions()
            .filter(|r| r.is_sub_region())
            .any(|r| location.region(r).is_some_and(|set| !set.is_contiguous()))
}

/// A Cellular Potts simulation: lattice, cells, energy terms and RNG.
pub struct Potts {
    lattice: Lattice,
    cells: CellArena,
    hamiltonian: Hamiltonian,
    populations: BTreeMap<u32, PopulationParameters>,
    rng: ChaCha8Rng,
    temperature: f64,
    steps: usize,
    /// Set when any population declares regions; flips then keep the region
    /// array in step with the identity array.
    has_regions: bool,
    tick: u64,
}

impl Potts {
    /// Validates `config` and builds an empty simulation. The RNG is seeded
    /// from `potts.seed` if present, otherwise from entropy.
    pub fn new(config: &SimulationConfig) -> anyhow::Result<Self> {
        let rng = match config.potts.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Like [`Potts::new`] with an injected RNG.
    pub fn with_rng(config: &SimulationConfig, rng: ChaCha8Rng) -> anyhow::Result<Self> {
        config.validate()?;
        let lattice = Lattice::new(
            config.lattice.length,
            config.lattice.width,
            config.lattice.height,
        );
        let hamiltonian = Hamiltonian::new(config, &lattice)
            .map_err(|e| e.with_context("Failed to build Hamiltonian"))?;
        tracing::debug!(
            terms = ?config.potts.terms,
            steps = config.steps(),
            fingerprint = %config.fingerprint(),
            "Potts engine created"
        );
        Ok(Self {
            lattice,
            cells: CellArena::new(),
            hamiltonian,
            populations: config
                .populations
                .iter()
                .map(|p| (p.code, p.clone()))
                .collect(),
            rng,
            temperature: config.potts.temperature,
            steps: config.steps(),
            has_regions: config.populations.iter().any(PopulationParameters::has_regions),
            tick: 0,
        })
    }

    #[must_use]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    #[must_use]
    pub fn cells(&self) -> &CellArena {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, id: u32) -> Option<&PottsCell> {
        self.cells.get(id)
    }

    /// Mutable cell access, for changing targets between steps.
    pub fn cell_mut(&mut self, id: u32) -> Option<&mut PottsCell> {
        self.cells.get_mut(id)
    }

    #[must_use]
    pub fn hamiltonian(&self) -> &Hamiltonian {
        &self.hamiltonian
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Trials per step.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Completed steps.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Places a new cell of `population`.
    ///
    /// `voxels` go to the default region; `region_voxels` go to the given
    /// sub-regions and require a population that declares them. All voxels
    /// must be interior, unoccupied and distinct. The cell's targets start
    /// at its placed shape. Returns the new cell id.
    pub fn add_cell(
        &mut self,
        population: u32,
        voxels: &[Voxel],
        region_voxels: &[(Region, Voxel)],
    ) -> Result<u32> {
        let pop = self
            .populations
            .get(&population)
            .ok_or(PottsError::UnknownPopulation(population))?;
        if voxels.is_empty() && region_voxels.is_empty() {
            return Err(PottsError::config("a cell needs at least one voxel"));
        }

        let placements = voxels
            .iter()
            .map(|&v| (Region::Default, v))
            .chain(region_voxels.iter().copied());
        let mut seen = BTreeSet::new();
        for (region, v) in placements.clone() {
            if !self.lattice.is_interior(v) {
                return Err(PottsError::invalid_voxel(v, "outside the lattice interior"));
            }
            if self.lattice.id(v) != 0 {
                return Err(PottsError::invalid_voxel(v, "already occupied"));
            }
            if !seen.insert(v) {
                return Err(PottsError::invalid_voxel(v, "listed more than once"));
            }
            if region.is_sub_region() && !pop.regions.contains(&region) {
                return Err(PottsError::InvalidRegion {
                    region,
                    population: pop.name.clone(),
                });
            }
        }

        let mut location = PottsLocation::new(self.lattice.topology(), &pop.declared_regions());
        for (region, v) in placements.clone() {
            location.add_to(region, v);
        }
        let id = self.cells.next_id();
        let cell = PottsCell::new(id, population, location);
        self.hamiltonian
            .register(&cell)
            .map_err(|e| e.with_context(format!("Failed to register cell {id}")))?;

        let allocated = self.cells.allocate();
        debug_assert_eq!(allocated, id);
        for (region, v) in placements {
            self.lattice.set_id(v, id);
            if self.has_regions {
                self.lattice.set_region(v, region);
            }
        }
        tracing::debug!(
            id,
            population,
            volume = cell.location().volume(),
            "Cell registered"
        );
        self.cells.insert(cell);
        Ok(id)
    }

    /// Removes cell `id`, returning its voxels to medium. The id becomes
    /// the next one handed out.
    pub fn remove_cell(&mut self, id: u32) -> Result<PottsCell> {
        let cell = self.cells.remove(id).ok_or(PottsError::UnknownCell(id))?;
        for v in cell.location().voxels() {
            self.lattice.set_id(v, 0);
            self.lattice.set_region(v, Region::Undefined);
        }
        self.hamiltonian.deregister(id);
        tracing::debug!(id, "Cell deregistered");
        Ok(cell)
    }

    /// Runs one Monte Carlo step.
    pub fn step(&mut self) -> StepStats {
        let start = Instant::now();
        let mut stats = StepStats::default();
        for _ in 0..self.steps {
            let v = self.random_voxel();
            let outcome = self.trial(v, None);
            if outcome == TrialOutcome::NonFinite && stats.non_finite == 0 {
                tracing::warn!(
                    tick = self.tick,
                    voxel = %v,
                    "Non-finite energy change, trial rejected"
                );
            }
            stats.record(outcome);
        }
        self.tick += 1;
        tracing::info!(
            tick = self.tick,
            trials = stats.trials,
            accepted = stats.accepted,
            duration_ms = start.elapsed().as_millis() as u64,
            "Monte Carlo step"
        );
        stats
    }

    /// Runs one trial at `v` with acceptance draw `draw` in `[0, 1)`.
    /// The candidate choice still comes from the internal RNG.
    pub fn trial_at(&mut self, v: Voxel, draw: f64) -> Result<TrialOutcome> {
        if !self.lattice.is_interior(v) {
            return Err(PottsError::invalid_voxel(v, "outside the lattice interior"));
        }
        Ok(self.trial(v, Some(draw)))
    }

    /// Returns ids of cells that are split into several pieces, either as a
    /// whole or within one of their sub-regions. Empty when all is well.
    #[must_use]
    pub fn validate_connectivity(&self) -> Vec<u32> {
        let cells: Vec<&PottsCell> = self.cells.iter().collect();

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            cells.par_iter().filter(|c| is_split(c)).map(|c| c.id()).collect()
        }
        #[cfg(not(feature = "rayon"))]
        {
            cells.iter().filter(|c| is_split(c)).map(|c| c.id()).collect()
        }
    }

    fn random_voxel(&mut self) -> Voxel {
        let x = self.rng.gen_range(1..=self.lattice.length() as i32);
        let y = self.rng.gen_range(1..=self.lattice.width() as i32);
        let z = match self.lattice.topology() {
            Topology::Planar => 0,
            Topology::Volumetric => self.rng.gen_range(1..=self.lattice.height() as i32),
        };
        Voxel::new(x, y, z)
    }

    fn trial(&mut self, v: Voxel, draw: Option<f64>) -> TrialOutcome {
        let source = self.lattice.id(v);
        let region = self.lattice.region(v);

        if self.cells.get(source).is_some_and(PottsCell::has_regions) {
            let targets = self.region_candidates(v, source, region);
            if !targets.is_empty() {
                let target = targets.get(self.rng.gen_range(0..targets.len()));
                return self.region_trial(v, source, region, target, draw);
            }
        }

        let targets = self.id_candidates(v, source);
        if targets.is_empty() {
            return TrialOutcome::Noop;
        }
        let target = targets.get(self.rng.gen_range(0..targets.len()));
        self.id_trial(v, source, target, draw)
    }

    fn id_candidates(&self, v: Voxel, source: u32) -> Candidates<u32> {
        let mut out = Candidates::new();
        for n in self.lattice.topology().faces(v) {
            let id = self.lattice.id(n);
            if id != source {
                out.push(id);
            }
        }
        out
    }

    fn region_candidates(&self, v: Voxel, id: u32, region: Region) -> Candidates<Region> {
        let mut out = Candidates::new();
        for n in self.lattice.topology().faces(v) {
            if self.lattice.id(n) == id {
                let r = self.lattice.region(n);
                if r != region {
                    out.push(r);
                }
            }
        }
        out
    }

    /// Connectivity of both owners for an identity flip at `v`.
    fn id_flip_connected(&self, v: Voxel, source: u32, target: u32) -> bool {
        let topology = self.lattice.topology();
        let zero = source == 0;
        let region = self.lattice.region(v);
        [source, target].into_iter().filter(|&id| id > 0).all(|id| {
            is_connected(topology, &self.lattice.window(v, id), zero)
                && (!region.is_sub_region()
                    || is_connected(topology, &self.lattice.region_window(v, id, region), false))
        })
    }

    fn region_flip_connected(&self, v: Voxel, id: u32, source: Region, target: Region) -> bool {
        let topology = self.lattice.topology();
        let zero = source == Region::Default;
        [source, target]
            .into_iter()
            .filter(|r| r.is_sub_region())
            .all(|r| is_connected(topology, &self.lattice.region_window(v, id, r), zero))
    }

    fn metropolis(&mut self, delta: f64, draw: Option<f64>) -> TrialOutcome {
        let r = draw.unwrap_or_else(|| self.rng.gen::<f64>());
        if !delta.is_finite() {
            TrialOutcome::NonFinite
        } else if accepts(delta, self.temperature, r) {
            TrialOutcome::Accepted
        } else {
            TrialOutcome::Rejected
        }
    }

    fn id_trial(&mut self, v: Voxel, source: u32, target: u32, draw: Option<f64>) -> TrialOutcome {
        if !self.id_flip_connected(v, source, target) {
            return TrialOutcome::Disconnected;
        }
        let view = TrialView {
            lattice: &self.lattice,
            cells: &self.cells,
        };
        let delta = self.hamiltonian.delta(&view, source, target, v);
        let outcome = self.metropolis(delta, draw);
        if outcome == TrialOutcome::Accepted {
            self.lattice.set_id(v, target);
            if self.has_regions {
                let region = if target == 0 {
                    Region::Undefined
                } else {
                    Region::Default
                };
                self.lattice.set_region(v, region);
            }
            if let Some(cell) = self.cells.get_mut(source) {
                cell.location_mut().remove(v);
            }
            if let Some(cell) = self.cells.get_mut(target) {
                cell.location_mut().add(v);
            }
        }
        outcome
    }

    fn region_trial(
        &mut self,
        v: Voxel,
        id: u32,
        source: Region,
        target: Region,
        draw: Option<f64>,
    ) -> TrialOutcome {
        if !self.region_flip_connected(v, id, source, target) {
            return TrialOutcome::Disconnected;
        }
        let view = TrialView {
            lattice: &self.lattice,
            cells: &self.cells,
        };
        let delta = self.hamiltonian.delta_region(&view, id, source, target, v);
        let outcome = self.metropolis(delta, draw);
        if outcome == TrialOutcome::Accepted {
            self.lattice.set_region(v, target);
            if let Some(cell) = self.cells.get_mut(id) {
                cell.location_mut().move_region(v, source, target);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potts_data::{LambdaParameters, TermKind};

    fn volume_only(length: usize, width: usize, height: usize) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.lattice.length = length;
        config.lattice.width = width;
        config.lattice.height = height;
        config.potts.terms = vec![TermKind::Volume];
        config.potts.temperature = 1.0;
        config.potts.seed = Some(7);
        config.populations[0].volume = LambdaParameters::new(1.0);
        config
    }

    #[test]
    fn test_accepts() {
        assert!(accepts(-1.0, 1.0, 0.999));
        assert!(accepts(0.0, 1.0, 0.999));
        assert!(accepts(1.0, 1.0, 0.1));
        assert!(!accepts(1.0, 1.0, 0.9));
        assert!(!accepts(f64::NAN, 1.0, 0.0));
        assert!(!accepts(f64::NEG_INFINITY, 1.0, 0.0));
    }

    #[test]
    fn test_candidates_keep_scan_order() {
        let mut c = Candidates::<u32>::new();
        for id in [3, 0, 3, 5, 0] {
            c.push(id);
        }
        assert_eq!(c.len(), 3);
        assert_eq!([c.get(0), c.get(1), c.get(2)], [3, 0, 5]);
    }

    #[test]
    fn test_step_count() {
        let mut config = volume_only(5, 4, 1);
        config.potts.mcs = 1.5;
        let potts = Potts::new(&config).unwrap();
        assert_eq!(potts.steps(), 30);
        let potts = Potts::new(&volume_only(3, 3, 3)).unwrap();
        assert_eq!(potts.steps(), 27);
    }

    #[test]
    fn test_add_cell_validation() {
        let mut potts = Potts::new(&volume_only(5, 5, 1)).unwrap();
        assert!(matches!(
            potts.add_cell(9, &[Voxel::new(1, 1, 0)], &[]),
            Err(PottsError::UnknownPopulation(9))
        ));
        assert!(matches!(
            potts.add_cell(1, &[Voxel::new(0, 1, 0)], &[]),
            Err(PottsError::InvalidVoxel { .. })
        ));
        assert!(matches!(
            potts.add_cell(1, &[Voxel::new(1, 1, 1)], &[]),
            Err(PottsError::InvalidVoxel { .. })
        ));
        assert!(matches!(
            potts.add_cell(1, &[Voxel::new(1, 1, 0)], &[(Region::Nucleus, Voxel::new(1, 2, 0))]),
            Err(PottsError::InvalidRegion { .. })
        ));
        let id = potts.add_cell(1, &[Voxel::new(1, 1, 0)], &[]).unwrap();
        assert_eq!(id, 1);
        assert!(matches!(
            potts.add_cell(1, &[Voxel::new(1, 1, 0)], &[]),
            Err(PottsError::InvalidVoxel { .. })
        ));
        assert_eq!(potts.lattice().id(Voxel::new(1, 1, 0)), 1);
        // Failed placements leave no trace.
        assert_eq!(potts.cells().len(), 1);
        assert_eq!(potts.cells().next_id(), 2);
    }

    #[test]
    fn test_remove_cell_reuses_id() {
        let mut potts = Potts::new(&volume_only(5, 5, 1)).unwrap();
        let a = potts.add_cell(1, &[Voxel::new(1, 1, 0)], &[]).unwrap();
        let _b = potts.add_cell(1, &[Voxel::new(3, 3, 0)], &[]).unwrap();
        let removed = potts.remove_cell(a).unwrap();
        assert_eq!(removed.id(), a);
        assert_eq!(potts.lattice().id(Voxel::new(1, 1, 0)), 0);
        assert!(matches!(potts.remove_cell(a), Err(PottsError::UnknownCell(_))));
        let c = potts.add_cell(1, &[Voxel::new(5, 5, 0)], &[]).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn test_noop_on_isolated_medium() {
        let mut potts = Potts::new(&volume_only(5, 5, 1)).unwrap();
        let outcome = potts.trial_at(Voxel::new(3, 3, 0), 0.0).unwrap();
        assert_eq!(outcome, TrialOutcome::Noop);
        assert!(potts.trial_at(Voxel::new(0, 0, 0), 0.0).is_err());
    }

    #[test]
    fn test_growth_accept_and_reject() {
        let mut potts = Potts::new(&volume_only(5, 5, 1)).unwrap();
        let id = potts.add_cell(1, &[Voxel::new(3, 3, 0)], &[]).unwrap();
        let v = Voxel::new(3, 2, 0);

        assert_eq!(potts.trial_at(v, 0.9).unwrap(), TrialOutcome::Rejected);
        assert_eq!(potts.lattice().id(v), 0);

        assert_eq!(potts.trial_at(v, 0.1).unwrap(), TrialOutcome::Accepted);
        assert_eq!(potts.lattice().id(v), id);
        let cell = potts.cell(id).unwrap();
        assert_eq!(cell.location().volume(), 2);
        assert_eq!(cell.location().surface(), 6);
    }

    #[test]
    fn test_source_disconnect_rejected() {
        let mut potts = Potts::new(&volume_only(5, 5, 1)).unwrap();
        let voxels = [Voxel::new(2, 3, 0), Voxel::new(3, 3, 0), Voxel::new(4, 3, 0)];
        let id = potts.add_cell(1, &voxels, &[]).unwrap();
        // Removing the middle of a bar would split it.
        let outcome = potts.trial_at(Voxel::new(3, 3, 0), 0.0).unwrap();
        assert_eq!(outcome, TrialOutcome::Disconnected);
        assert_eq!(potts.lattice().id(Voxel::new(3, 3, 0)), id);
    }

    #[test]
    fn test_step_preserves_invariants() {
        let mut config = volume_only(12, 12, 1);
        config.potts.terms = vec![TermKind::Adhesion, TermKind::Volume, TermKind::Surface];
        let mut potts = Potts::new(&config).unwrap();
        let mut voxels = Vec::new();
        for x in 4..=7 {
            for y in 4..=7 {
                voxels.push(Voxel::new(x, y, 0));
            }
        }
        let id = potts.add_cell(1, &voxels, &[]).unwrap();
        for _ in 0..5 {
            let stats = potts.step();
            assert_eq!(stats.trials, 144);
        }
        assert!(potts.validate_connectivity().is_empty());
        assert!(potts.lattice().border_is_clear());
        let cell = potts.cell(id).unwrap();
        let painted = potts.lattice().ids().iter().filter(|&&i| i == id).count();
        assert_eq!(painted, cell.location().volume());
        assert_eq!(cell.location().surface(), cell.location().all().calculate_surface());
        assert_eq!(potts.tick(), 5);
    }
}
