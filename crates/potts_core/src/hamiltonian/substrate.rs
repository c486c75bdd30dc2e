//! Adhesion to the substrate plane below the lattice.
//!
//! The effect decays with height as `z^power`, with the power chosen so the
//! adhesion at the configured threshold height is 1% of its value at `z = 1`.

use crate::cell::PottsCell;
use crate::config::SimulationConfig;
use crate::error::{PottsError, Result};
use crate::lattice::Lattice;
use crate::slots::Slots;
use potts_data::{TermKind, Voxel};
use std::collections::BTreeMap;

/// Fraction of substrate adhesion left at the threshold height.
const THRESHOLD_FRACTION: f64 = 0.01;

/// Normalizes the 3×3 footprint sum.
const NEIGHBORHOOD_SIZE: f64 = 26.0;

#[derive(Debug, Clone)]
pub struct SubstrateHamiltonian {
    populations: BTreeMap<u32, f64>,
    cells: Slots<f64>,
    /// Substrate coverage over the `x`-`y` footprint, border included.
    substrates: Vec<f64>,
    ny: usize,
    power: f64,
}

impl SubstrateHamiltonian {
    pub fn new(config: &SimulationConfig, lattice: &Lattice) -> Result<Self> {
        let populations = config
            .populations
            .iter()
            .map(|pop| {
                pop.substrate
                    .adhesion
                    .map(|a| (pop.code, a))
                    .ok_or_else(|| PottsError::missing(TermKind::Substrate, "adhesion", &pop.name))
            })
            .collect::<Result<_>>()?;
        let (nx, ny, _) = lattice.dims();
        let power = THRESHOLD_FRACTION.ln() / config.substrate.height_threshold.ln();
        Ok(Self {
            populations,
            cells: Slots::new(),
            substrates: vec![1.0; nx * ny],
            ny,
            power,
        })
    }

    #[must_use]
    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn register(&mut self, cell: &PottsCell) -> Result<()> {
        let adhesion = self
            .populations
            .get(&cell.population())
            .ok_or(PottsError::UnknownPopulation(cell.population()))?;
        self.cells.insert(cell.id(), *adhesion);
        Ok(())
    }

    pub fn deregister(&mut self, id: u32) {
        self.cells.remove(id);
    }

    fn footprint(&self, v: Voxel) -> f64 {
        let mut sum = 0.0;
        for x in v.x - 1..=v.x + 1 {
            for y in v.y - 1..=v.y + 1 {
                sum += self.substrates[x as usize * self.ny + y as usize];
            }
        }
        sum
    }

    pub fn energy(&self, id: u32, v: Voxel) -> f64 {
        if id == 0 {
            return 0.0;
        }
        let Some(&adhesion) = self.cells.get(id) else {
            return f64::NAN;
        };
        -self.footprint(v) / NEIGHBORHOOD_SIZE * adhesion * f64::from(v.z).powf(self.power)
    }

    pub fn delta(&self, source: u32, target: u32, v: Voxel) -> f64 {
        self.energy(target, v) - self.energy(source, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::tests::{population, Fixture};

    const EPSILON: f64 = 1e-10;

    fn config() -> SimulationConfig {
        let mut a = population("a", 1);
        a.substrate.adhesion = Some(2.0);
        let mut cfg = SimulationConfig {
            populations: vec![a],
            ..SimulationConfig::default()
        };
        cfg.lattice.height = 10;
        cfg.substrate.height_threshold = 10.0;
        cfg
    }

    #[test]
    fn test_power_hits_threshold_fraction() {
        let lattice = Lattice::new(4, 4, 10);
        let h = SubstrateHamiltonian::new(&config(), &lattice).unwrap();
        assert!((h.power() - (-2.0)).abs() < EPSILON);
        assert!((10f64.powf(h.power()) - THRESHOLD_FRACTION).abs() < EPSILON);
    }

    #[test]
    fn test_energy_decays_with_height() {
        let mut fx = Fixture::new(4, 4, 10);
        let id = fx.place(1, &[], &[(2, 2, 1)], &[]);
        let mut h = SubstrateHamiltonian::new(&config(), &fx.lattice).unwrap();
        h.register(fx.cells.get(id).unwrap()).unwrap();

        let ground = h.energy(id, Voxel::new(2, 2, 1));
        assert!((ground - (-9.0 / 26.0 * 2.0)).abs() < EPSILON);
        let high = h.energy(id, Voxel::new(2, 2, 10));
        assert!((high - ground * 0.01).abs() < EPSILON);
        assert_eq!(h.energy(0, Voxel::new(2, 2, 1)), 0.0);
        // Leaving the ground costs the lost adhesion.
        assert!((h.delta(id, 0, Voxel::new(2, 2, 1)) + ground).abs() < EPSILON);
    }

    #[test]
    fn test_missing_adhesion_fails() {
        let mut cfg = config();
        cfg.populations[0].substrate.adhesion = None;
        let lattice = Lattice::new(4, 4, 10);
        assert!(matches!(
            SubstrateHamiltonian::new(&cfg, &lattice),
            Err(PottsError::MissingParameter { term: TermKind::Substrate, .. })
        ));
    }
}
