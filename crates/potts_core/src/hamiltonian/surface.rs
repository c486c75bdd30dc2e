//! Quadratic penalty on deviation from target surface.
//!
//! A flip does not change surface by a fixed amount; the change for each
//! side is read from the face neighbors of the flipped voxel.

use super::volume::{resolve_lambdas, LambdaConfig};
use super::{quadratic, TrialView};
use crate::cell::PottsCell;
use crate::config::SimulationConfig;
use crate::error::{PottsError, Result};
use crate::slots::Slots;
use potts_data::{Region, TermKind, Voxel};
use std::collections::BTreeMap;

/// Surface change `[source, target]` when `v` moves from the owner matched
/// by `is_source` to the owner matched by `is_target`.
pub(crate) fn surface_change(
    view: &TrialView<'_>,
    v: Voxel,
    is_source: impl Fn(Voxel) -> bool,
    is_target: impl Fn(Voxel) -> bool,
) -> [i32; 2] {
    let mut before = [0, 0];
    let mut after = [0, 0];
    for n in view.lattice.topology().faces(v) {
        if !is_source(n) {
            before[0] += 1;
            if is_target(n) {
                before[1] += 1;
            }
        }
        if !is_target(n) {
            after[1] += 1;
            if is_source(n) {
                after[0] += 1;
            }
        }
    }
    [after[0] - before[0], after[1] - before[1]]
}

#[derive(Debug, Clone)]
pub struct SurfaceHamiltonian {
    populations: BTreeMap<u32, LambdaConfig>,
    cells: Slots<LambdaConfig>,
}

impl SurfaceHamiltonian {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        Ok(Self {
            populations: resolve_lambdas(TermKind::Surface, config, |p| &p.surface)?,
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

    pub fn energy(&self, view: &TrialView<'_>, id: u32, change: i32) -> f64 {
        if id == 0 {
            return 0.0;
        }
        match (view.cell(id), self.cells.get(id)) {
            (Some(cell), Some(config)) => quadratic(
                config.lambda,
                cell.location().surface() as f64,
                cell.target_surface(),
                f64::from(change),
            ),
            _ => f64::NAN,
        }
    }

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
            cell.location().region_surface(region) as f64,
            targets.surface,
            f64::from(change),
        )
    }

    pub fn delta(&self, view: &TrialView<'_>, source: u32, target: u32, v: Voxel) -> f64 {
        let lattice = view.lattice;
        let [cs, ct] = surface_change(
            view,
            v,
            |n| lattice.id(n) == source,
            |n| lattice.id(n) == target,
        );
        let source_delta = self.energy(view, source, cs) - self.energy(view, source, 0);
        let target_delta = self.energy(view, target, ct) - self.energy(view, target, 0);
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
        let lattice = view.lattice;
        let [cs, ct] = surface_change(
            view,
            v,
            |n| lattice.id(n) == id && lattice.region(n) == source,
            |n| lattice.id(n) == id && lattice.region(n) == target,
        );
        let source_delta =
            self.region_energy(view, id, source, cs) - self.region_energy(view, id, source, 0);
        let target_delta =
            self.region_energy(view, id, target, ct) - self.region_energy(view, id, target, 0);
        source_delta + target_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::tests::{population, Fixture};
    use potts_data::LambdaParameters;

    fn config() -> SimulationConfig {
        let mut a = population("a", 1);
        a.surface = LambdaParameters::new(1.0).with_region(Region::Nucleus, 2.0);
        a.regions = vec![Region::Nucleus];
        SimulationConfig {
            populations: vec![a],
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_change_matches_recomputed_surface() {
        let mut fx = Fixture::new(6, 6, 1);
        let id = fx.place(1, &[], &[(2, 2, 0), (3, 2, 0), (2, 3, 0)], &[]);
        let lattice = &fx.lattice;
        let view = fx.view();
        // Filling the corner at (3,3) touches two cell faces.
        let [cs, ct] = surface_change(
            &view,
            Voxel::new(3, 3, 0),
            |n| lattice.id(n) == 0,
            |n| lattice.id(n) == id,
        );
        assert_eq!(ct, 0);
        assert_eq!(cs, 0);

        let before = fx.cells.get(id).unwrap().location().surface() as i32;
        let mut loc = fx.cells.get(id).unwrap().location().clone();
        loc.add(Voxel::new(3, 3, 0));
        assert_eq!(loc.surface() as i32 - before, ct);

        // Extending a single-voxel arm adds two faces.
        let [_, ct] = surface_change(
            &view,
            Voxel::new(4, 2, 0),
            |n| lattice.id(n) == 0,
            |n| lattice.id(n) == id,
        );
        assert_eq!(ct, 2);
    }

    #[test]
    fn test_delta_for_growth() {
        let mut fx = Fixture::new(6, 6, 1);
        let id = fx.place(1, &[], &[(2, 2, 0)], &[]);
        fx.cell_mut(id).set_targets(1.0, 6.0);
        let mut h = SurfaceHamiltonian::new(&config()).unwrap();
        h.register(fx.cells.get(id).unwrap()).unwrap();

        // Surface 4 -> 6 reaches the target: (6-6)^2 - (4-6)^2.
        let delta = h.delta(&fx.view(), 0, id, Voxel::new(3, 2, 0));
        assert_eq!(delta, -4.0);
    }

    #[test]
    fn test_region_delta() {
        let mut fx = Fixture::new(6, 6, 1);
        let regions = [Region::Default, Region::Nucleus];
        let id = fx.place(
            1,
            &regions,
            &[(2, 2, 0), (3, 2, 0), (4, 2, 0)],
            &[((2, 2, 0), Region::Nucleus)],
        );
        let mut h = SurfaceHamiltonian::new(&config()).unwrap();
        h.register(fx.cells.get(id).unwrap()).unwrap();
        fx.cell_mut(id).set_region_targets(Region::Nucleus, 2.0, 6.0);

        // Nucleus grows from 4 faces to 6: 2 * ((6-6)^2 - (4-6)^2).
        let delta = h.delta_region(&fx.view(), id, Region::Default, Region::Nucleus, Voxel::new(3, 2, 0));
        assert_eq!(delta, -8.0);
    }
}
