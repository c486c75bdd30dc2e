//! Cells as seen by the lattice engine.

use crate::location::PottsLocation;
use crate::slots::Slots;
use potts_data::{Region, RegionMap};

/// Target volume and surface for a cell or one of its regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targets {
    pub volume: f64,
    pub surface: f64,
}

/// A cell registered with the engine.
///
/// Targets start at the placed shape and can be moved by the caller; the
/// engine only reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct PottsCell {
    id: u32,
    population: u32,
    location: PottsLocation,
    targets: Targets,
    region_targets: RegionMap<Targets>,
}

impl PottsCell {
    /// Wraps a placed location, taking its current shape as the target.
    #[must_use]
    pub fn new(id: u32, population: u32, location: PottsLocation) -> Self {
        let targets = Targets {
            volume: location.volume() as f64,
            surface: location.surface() as f64,
        };
        let region_targets = location
            .regions()
            .filter_map(|r| {
                location.region(r).map(|set| {
                    (
                        r,
                        Targets {
                            volume: set.volume() as f64,
                            surface: set.surface() as f64,
                        },
                    )
                })
            })
            .collect();
        Self {
            id,
            population,
            location,
            targets,
            region_targets,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn population(&self) -> u32 {
        self.population
    }

    #[inline]
    #[must_use]
    pub fn location(&self) -> &PottsLocation {
        &self.location
    }

    pub(crate) fn location_mut(&mut self) -> &mut PottsLocation {
        &mut self.location
    }

    #[must_use]
    pub fn has_regions(&self) -> bool {
        self.location.has_regions()
    }

    #[must_use]
    pub fn target_volume(&self) -> f64 {
        self.targets.volume
    }

    #[must_use]
    pub fn target_surface(&self) -> f64 {
        self.targets.surface
    }

    /// Targets for `region`, if the cell holds it.
    #[must_use]
    pub fn region_targets(&self, region: Region) -> Option<Targets> {
        self.region_targets.get(region).copied()
    }

    pub fn set_targets(&mut self, volume: f64, surface: f64) {
        self.targets = Targets { volume, surface };
    }

    /// Sets targets for a region the cell holds; ignored otherwise.
    pub fn set_region_targets(&mut self, region: Region, volume: f64, surface: f64) {
        if let Some(targets) = self.region_targets.get_mut(region) {
            *targets = Targets { volume, surface };
        }
    }
}

/// Live cells indexed by id, with id reuse.
///
/// Id 0 is medium and never handed out. Freed ids are reused most recent
/// first, so a fixed sequence of placements and removals always yields the
/// same ids.
#[derive(Debug, Clone, Default)]
pub struct CellArena {
    cells: Slots<PottsCell>,
    free: Vec<u32>,
}

impl CellArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next [`CellArena::allocate`] will return.
    #[must_use]
    pub fn next_id(&self) -> u32 {
        self.free
            .last()
            .copied()
            .unwrap_or_else(|| self.cells.extent().max(1))
    }

    pub(crate) fn allocate(&mut self) -> u32 {
        match self.free.pop() {
            Some(id) => id,
            None => self.cells.extent().max(1),
        }
    }

    pub(crate) fn insert(&mut self, cell: PottsCell) {
        let id = cell.id();
        self.cells.insert(id, cell);
    }

    pub(crate) fn remove(&mut self, id: u32) -> Option<PottsCell> {
        let cell = self.cells.remove(id)?;
        self.free.push(id);
        Some(cell)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&PottsCell> {
        if id == 0 {
            return None;
        }
        self.cells.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: u32) -> Option<&mut PottsCell> {
        if id == 0 {
            return None;
        }
        self.cells.get_mut(id)
    }

    /// Live cells in id order.
    pub fn iter(&self) -> impl Iterator<Item = &PottsCell> {
        self.cells.iter().map(|(_, c)| c)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.iter().map(|(id, _)| id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
