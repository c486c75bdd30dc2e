//! Voxel ownership views for one cell.
//!
//! A [`PottsLocation`] keeps the cell's voxel set together with incrementally
//! maintained volume, surface, height and centroid. Region-bearing cells keep
//! one [`VoxelSet`] per region alongside the whole-cell set; a voxel always
//! lives in the whole-cell set and in exactly one region set.

use crate::topology::Topology;
use potts_data::{Region, RegionMap, Voxel};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// An ordered voxel set with cached shape measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelSet {
    topology: Topology,
    voxels: BTreeSet<Voxel>,
    surface: usize,
    sums: [i64; 3],
    layers: BTreeMap<i32, usize>,
}

impl VoxelSet {
    #[must_use]
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            voxels: BTreeSet::new(),
            surface: 0,
            sums: [0; 3],
            layers: BTreeMap::new(),
        }
    }

    /// Face balance of `v` against the current set: +1 per exposed face,
    /// -1 per face shared with a member.
    fn surface_change(&self, v: Voxel) -> i64 {
        self.topology
            .faces(v)
            .map(|n| if self.voxels.contains(&n) { -1 } else { 1 })
            .sum()
    }

    /// Adds `v`; returns false if already present.
    pub fn add(&mut self, v: Voxel) -> bool {
        if !self.voxels.insert(v) {
            return false;
        }
        let surface = self.surface as i64 + self.surface_change(v);
        self.surface = surface.max(0) as usize;
        self.sums[0] += i64::from(v.x);
        self.sums[1] += i64::from(v.y);
        self.sums[2] += i64::from(v.z);
        *self.layers.entry(v.z).or_insert(0) += 1;
        true
    }

    /// Removes `v`; returns false if absent.
    pub fn remove(&mut self, v: Voxel) -> bool {
        if !self.voxels.remove(&v) {
            return false;
        }
        let surface = self.surface as i64 - self.surface_change(v);
        self.surface = surface.max(0) as usize;
        self.sums[0] -= i64::from(v.x);
        self.sums[1] -= i64::from(v.y);
        self.sums[2] -= i64::from(v.z);
        if let Some(count) = self.layers.get_mut(&v.z) {
            *count -= 1;
            if *count == 0 {
                self.layers.remove(&v.z);
            }
        }
        true
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, v: Voxel) -> bool {
        self.voxels.contains(&v)
    }

    #[inline]
    #[must_use]
    pub fn volume(&self) -> usize {
        self.voxels.len()
    }

    #[inline]
    #[must_use]
    pub fn surface(&self) -> usize {
        self.surface
    }

    /// Span of occupied z layers; 0 when empty.
    #[must_use]
    pub fn height(&self) -> usize {
        match (self.layers.keys().next(), self.layers.keys().next_back()) {
            (Some(lo), Some(hi)) => (hi - lo + 1) as usize,
            _ => 0,
        }
    }

    /// Mean voxel coordinate; the origin when empty.
    #[must_use]
    pub fn centroid(&self) -> [f64; 3] {
        let n = self.voxels.len();
        if n == 0 {
            return [0.0; 3];
        }
        let n = n as f64;
        [
            self.sums[0] as f64 / n,
            self.sums[1] as f64 / n,
            self.sums[2] as f64 / n,
        ]
    }

    /// z coordinates of members sharing the `(x, y)` footprint, ascending.
    pub fn column(&self, x: i32, y: i32) -> impl Iterator<Item = i32> + '_ {
        self.voxels
            .range(Voxel::new(x, y, i32::MIN)..=Voxel::new(x, y, i32::MAX))
            .map(|v| v.z)
    }

    pub fn iter(&self) -> impl Iterator<Item = Voxel> + '_ {
        self.voxels.iter().copied()
    }

    /// True if a face-adjacent flood fill from any member reaches every
    /// member. Empty sets count as contiguous.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        let Some(&start) = self.voxels.iter().next() else {
            return true;
        };
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            for n in self.topology.faces(v) {
                if self.voxels.contains(&n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        seen.len() == self.voxels.len()
    }

    /// Surface recomputed from scratch.
    #[must_use]
    pub fn calculate_surface(&self) -> usize {
        self.voxels
            .iter()
            .map(|&v| self.topology.faces(v).filter(|n| !self.voxels.contains(n)).count())
            .sum()
    }
}

/// Voxel ownership view of one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PottsLocation {
    all: VoxelSet,
    regions: RegionMap<VoxelSet>,
}

impl PottsLocation {
    /// Creates an empty location. `regions` lists the region sets to keep;
    /// pass an empty slice for cells without regions.
    #[must_use]
    pub fn new(topology: Topology, regions: &[Region]) -> Self {
        Self {
            all: VoxelSet::new(topology),
            regions: regions
                .iter()
                .map(|&r| (r, VoxelSet::new(topology)))
                .collect(),
        }
    }

    #[must_use]
    pub fn has_regions(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Whole-cell voxel set.
    #[must_use]
    pub fn all(&self) -> &VoxelSet {
        &self.all
    }

    #[must_use]
    pub fn region(&self, region: Region) -> Option<&VoxelSet> {
        self.regions.get(region)
    }

    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.regions.keys()
    }

    #[must_use]
    pub fn region_of(&self, v: Voxel) -> Option<Region> {
        self.regions
            .iter()
            .find(|(_, set)| set.contains(v))
            .map(|(r, _)| r)
    }

    /// Adds `v` to the cell, in the default region if the cell has regions.
    pub fn add(&mut self, v: Voxel) {
        self.add_to(Region::Default, v);
    }

    /// Adds `v` to the cell and to `region`. The region is ignored for cells
    /// without regions.
    pub fn add_to(&mut self, region: Region, v: Voxel) {
        if self.all.add(v) {
            if let Some(set) = self.regions.get_mut(region) {
                set.add(v);
            }
        }
    }

    /// Removes `v` from the cell and from whichever region held it.
    pub fn remove(&mut self, v: Voxel) {
        if self.all.remove(v) {
            for (_, set) in self.regions.iter_mut() {
                if set.remove(v) {
                    break;
                }
            }
        }
    }

    /// Moves `v` between region sets without touching the whole-cell set.
    pub fn move_region(&mut self, v: Voxel, from: Region, to: Region) {
        if let Some(set) = self.regions.get_mut(from) {
            set.remove(v);
        }
        if let Some(set) = self.regions.get_mut(to) {
            set.add(v);
        }
    }

    #[inline]
    #[must_use]
    pub fn volume(&self) -> usize {
        self.all.volume()
    }

    #[inline]
    #[must_use]
    pub fn surface(&self) -> usize {
        self.all.surface()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.all.height()
    }

    #[must_use]
    pub fn centroid(&self) -> [f64; 3] {
        self.all.centroid()
    }

    #[must_use]
    pub fn region_volume(&self, region: Region) -> usize {
        self.regions.get(region).map_or(0, VoxelSet::volume)
    }

    #[must_use]
    pub fn region_surface(&self, region: Region) -> usize {
        self.regions.get(region).map_or(0, VoxelSet::surface)
    }

    pub fn voxels(&self) -> impl Iterator<Item = Voxel> + '_ {
        self.all.iter()
    }
}
