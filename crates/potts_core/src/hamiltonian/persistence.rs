//! Directional persistence of cell movement.
//!
//! Each cell tracks a unit direction vector. A flip is rewarded in proportion
//! to how well the displacement it causes lines up with that vector, scaled
//! by the cell's surface. The vector blends toward the latest displacement
//! whenever the cell's volume has changed since it was last read.

use super::{region_values, TrialView};
use crate::cell::PottsCell;
use crate::config::SimulationConfig;
use crate::error::{PottsError, Result};
use crate::slots::Slots;
use potts_data::{Region, RegionMap, TermKind, Voxel};
use std::collections::BTreeMap;

/// Initial direction: straight down.
const DEFAULT_VECTOR: [f64; 3] = [0.0, 0.0, -1.0];

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Scales `v` to unit length. The zero vector stays zero.
#[inline]
fn normalize(v: [f64; 3]) -> [f64; 3] {
    let norm = dot(v, v).sqrt();
    if norm == 0.0 {
        v
    } else {
        [v[0] / norm, v[1] / norm, v[2] / norm]
    }
}

/// Unit displacement of a set's centroid caused by adding or removing `v`.
fn displacement(v: Voxel, centroid: [f64; 3], volume: usize, change: i32) -> [f64; 3] {
    let change = f64::from(change);
    let volume = volume as f64 + change;
    normalize([
        change * (f64::from(v.x) - centroid[0]) / volume,
        change * (f64::from(v.y) - centroid[1]) / volume,
        change * (f64::from(v.z) - centroid[2]) / volume,
    ])
}

#[derive(Debug, Clone, PartialEq)]
struct PopulationPersistence {
    lambda: f64,
    decay: f64,
    regions: RegionMap<f64>,
}

/// Per-cell persistence state.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceConfig {
    pub lambda: f64,
    pub decay: f64,
    pub threshold: f64,
    pub regions: RegionMap<f64>,
    vector: [f64; 3],
    displacement: [f64; 3],
    volume_check: usize,
}

impl PersistenceConfig {
    fn new(pop: &PopulationPersistence, threshold: f64, volume: usize) -> Self {
        Self {
            lambda: pop.lambda,
            decay: pop.decay,
            threshold,
            regions: pop.regions.clone(),
            vector: DEFAULT_VECTOR,
            displacement: [0.0; 3],
            volume_check: volume,
        }
    }

    /// Direction vector, refreshed if `volume` differs from the last read.
    pub fn vector(&mut self, volume: usize) -> [f64; 3] {
        if volume != self.volume_check {
            self.volume_check = volume;
            let d = self.decay;
            self.vector[0] = (1.0 - d) * self.vector[0] + d * self.displacement[0];
            self.vector[1] = (1.0 - d) * self.vector[1] + d * self.displacement[1];
            self.vector[2] = -(volume as f64) / self.threshold;
            self.vector = normalize(self.vector);
        }
        self.vector
    }

    /// Last direction vector, without refreshing.
    #[must_use]
    pub fn current_vector(&self) -> [f64; 3] {
        self.vector
    }

    #[must_use]
    pub fn last_displacement(&self) -> [f64; 3] {
        self.displacement
    }
}

#[derive(Debug, Clone)]
pub struct PersistenceHamiltonian {
    populations: BTreeMap<u32, PopulationPersistence>,
    threshold: f64,
    cells: Slots<PersistenceConfig>,
}

impl PersistenceHamiltonian {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let term = TermKind::Persistence;
        let mut populations = BTreeMap::new();
        for pop in &config.populations {
            let params = &pop.persistence;
            let lambda = params
                .lambda
                .ok_or_else(|| PottsError::missing(term, "lambda", &pop.name))?;
            let decay = params
                .decay
                .ok_or_else(|| PottsError::missing(term, "decay", &pop.name))?;
            let regions = region_values(term, pop, &params.regions, "lambda")?;
            populations.insert(
                pop.code,
                PopulationPersistence {
                    lambda,
                    decay,
                    regions,
                },
            );
        }
        Ok(Self {
            populations,
            threshold: config.persistence.volume_threshold,
            cells: Slots::new(),
        })
    }

    pub fn register(&mut self, cell: &PottsCell) -> Result<()> {
        let pop = self
            .populations
            .get(&cell.population())
            .ok_or(PottsError::UnknownPopulation(cell.population()))?;
        let config = PersistenceConfig::new(pop, self.threshold, cell.location().volume());
        self.cells.insert(cell.id(), config);
        Ok(())
    }

    pub fn deregister(&mut self, id: u32) {
        self.cells.remove(id);
    }

    #[must_use]
    pub fn config(&self, id: u32) -> Option<&PersistenceConfig> {
        self.cells.get(id)
    }

    /// Persistence energy of cell `id` for a flip at `v` changing its volume
    /// by `change`. Records the flip's displacement for the next refresh.
    pub fn energy(&mut self, view: &TrialView<'_>, id: u32, v: Voxel, change: i32) -> f64 {
        if id == 0 {
            return 0.0;
        }
        let (Some(cell), Some(config)) = (view.cell(id), self.cells.get_mut(id)) else {
            return f64::NAN;
        };
        let location = cell.location();
        let vector = config.vector(location.volume());
        config.displacement = displacement(v, location.centroid(), location.volume(), change);
        -config.lambda * dot(vector, config.displacement) * location.surface() as f64
    }

    /// Region persistence energy. Reads the stored vector without refreshing it.
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
        let (Some(set), Some(&lambda)) = (cell.location().region(region), config.regions.get(region))
        else {
            return f64::NAN;
        };
        let d = displacement(v, set.centroid(), set.volume(), change);
        -lambda * dot(config.vector, d) * set.surface() as f64
    }

    /// Persistence change for moving `v` from `source` to `target`.
    ///
    /// Each cell keeps the displacement of its own side of the flip: the
    /// source stores the removal, the target stores the addition. Rejected
    /// trials overwrite it too; only the next volume change folds it into
    /// the direction vector.
    pub fn delta(&mut self, view: &TrialView<'_>, source: u32, target: u32, v: Voxel) -> f64 {
        self.energy(view, source, v, -1) + self.energy(view, target, v, 1)
    }

    pub fn delta_region(
        &self,
        view: &TrialView<'_>,
        id: u32,
        source: Region,
        target: Region,
        v: Voxel,
    ) -> f64 {
        self.region_energy(view, id, source, v, -1) + self.region_energy(view, id, target, v, 1)
    }
}
