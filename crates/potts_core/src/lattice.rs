//! Identity and region arrays for the simulated volume.
//!
//! Both arrays cover the interior plus a one-voxel guard border. The border
//! is identity 0 forever, so neighbor scans from any interior voxel never
//! need bounds checks.
//!
//! Planar lattices (height 1) have a single layer at `z = 0`; volumetric
//! lattices use `z` in `1..=height` with border layers at `0` and
//! `height + 1`.

use crate::connectivity::Window;
use crate::topology::Topology;
use potts_data::{Region, Voxel};

#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    length: usize,
    width: usize,
    height: usize,
    nx: usize,
    ny: usize,
    nz: usize,
    topology: Topology,
    ids: Vec<u32>,
    regions: Vec<Region>,
}

impl Lattice {
    /// Creates an empty lattice with the given interior dimensions.
    #[must_use]
    pub fn new(length: usize, width: usize, height: usize) -> Self {
        let topology = Topology::from_height(height);
        let nx = length + 2;
        let ny = width + 2;
        let nz = if topology.is_volumetric() { height + 2 } else { 1 };
        let size = nx * ny * nz;
        Self {
            length,
            width,
            height,
            nx,
            ny,
            nz,
            topology,
            ids: vec![0; size],
            regions: vec![Region::Undefined; size],
        }
    }

    #[inline(always)]
    fn index(&self, v: Voxel) -> usize {
        (v.z as usize * self.nx + v.x as usize) * self.ny + v.y as usize
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Interior height; 1 for planar lattices.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Array dimensions including the border, as `(x, y, z)`.
    #[must_use]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    #[must_use]
    pub fn interior_count(&self) -> usize {
        self.length * self.width * self.height
    }

    /// True if `v` lies inside the arrays, border included.
    #[must_use]
    pub fn contains(&self, v: Voxel) -> bool {
        v.x >= 0
            && v.y >= 0
            && v.z >= 0
            && (v.x as usize) < self.nx
            && (v.y as usize) < self.ny
            && (v.z as usize) < self.nz
    }

    #[must_use]
    pub fn is_interior(&self, v: Voxel) -> bool {
        let in_plane = v.x >= 1
            && v.y >= 1
            && v.x as usize <= self.length
            && v.y as usize <= self.width;
        let in_depth = match self.topology {
            Topology::Planar => v.z == 0,
            Topology::Volumetric => v.z >= 1 && v.z as usize <= self.height,
        };
        in_plane && in_depth
    }

    /// Identity at `v`. Panics if `v` is outside the arrays.
    #[inline]
    #[must_use]
    pub fn id(&self, v: Voxel) -> u32 {
        self.ids[self.index(v)]
    }

    #[inline]
    #[must_use]
    pub fn region(&self, v: Voxel) -> Region {
        self.regions[self.index(v)]
    }

    #[inline]
    pub(crate) fn set_id(&mut self, v: Voxel, id: u32) {
        debug_assert!(self.is_interior(v), "write to border voxel {v}");
        let idx = self.index(v);
        self.ids[idx] = id;
    }

    #[inline]
    pub(crate) fn set_region(&mut self, v: Voxel, region: Region) {
        debug_assert!(self.is_interior(v), "write to border voxel {v}");
        let idx = self.index(v);
        self.regions[idx] = region;
    }

    /// Flat identity array, ordered `z`, then `x`, then `y`.
    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// All interior voxels in array order.
    pub fn interior_voxels(&self) -> impl Iterator<Item = Voxel> + '_ {
        let (z_lo, z_hi) = match self.topology {
            Topology::Planar => (0, 0),
            Topology::Volumetric => (1, self.height as i32),
        };
        (z_lo..=z_hi).flat_map(move |z| {
            (1..=self.length as i32)
                .flat_map(move |x| (1..=self.width as i32).map(move |y| Voxel::new(x, y, z)))
        })
    }

    /// True if every guard-border voxel still holds identity 0.
    #[must_use]
    pub fn border_is_clear(&self) -> bool {
        (0..self.nz as i32).all(|z| {
            (0..self.nx as i32).all(|x| {
                (0..self.ny as i32).all(|y| {
                    let v = Voxel::new(x, y, z);
                    self.is_interior(v) || (self.id(v) == 0 && self.region(v) == Region::Undefined)
                })
            })
        })
    }

    /// Membership window of identity `id` around `v`.
    #[inline]
    #[must_use]
    pub fn window(&self, v: Voxel, id: u32) -> Window {
        Window::from_fn(self.topology, |dx, dy, dz| {
            self.id(v.offset(dx, dy, dz)) == id
        })
    }

    /// Membership window of `(id, region)` around `v`.
    #[inline]
    #[must_use]
    pub fn region_window(&self, v: Voxel, id: u32, region: Region) -> Window {
        Window::from_fn(self.topology, |dx, dy, dz| {
            let n = v.offset(dx, dy, dz);
            self.id(n) == id && self.region(n) == region
        })
    }

    /// Hex-encoded SHA-256 over both arrays.
    #[must_use]
    pub fn digest(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        for id in &self.ids {
            hasher.update(id.to_le_bytes());
        }
        let regions: Vec<u8> = self.regions.iter().map(|r| *r as u8).collect();
        hasher.update(&regions);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_planar_dims() {
        let lattice = Lattice::new(5, 4, 1);
        assert_eq!(lattice.dims(), (7, 6, 1));
        assert_eq!(lattice.topology(), Topology::Planar);
        assert_eq!(lattice.interior_count(), 20);
        assert_eq!(lattice.interior_voxels().count(), 20);
    }

    #[test]
    fn test_volumetric_dims() {
        let lattice = Lattice::new(3, 3, 4);
        assert_eq!(lattice.dims(), (5, 5, 6));
        assert_eq!(lattice.interior_voxels().count(), 36);
        assert!(lattice.interior_voxels().all(|v| lattice.is_interior(v)));
    }

    #[test]
    fn test_interior_bounds() {
        let lattice = Lattice::new(5, 5, 1);
        assert!(lattice.is_interior(Voxel::new(1, 1, 0)));
        assert!(lattice.is_interior(Voxel::new(5, 5, 0)));
        assert!(!lattice.is_interior(Voxel::new(0, 3, 0)));
        assert!(!lattice.is_interior(Voxel::new(6, 3, 0)));
        assert!(!lattice.is_interior(Voxel::new(3, 3, 1)));
        assert!(lattice.contains(Voxel::new(6, 6, 0)));
        assert!(!lattice.contains(Voxel::new(-1, 0, 0)));
    }

    #[test]
    fn test_set_and_window() {
        let mut lattice = Lattice::new(5, 5, 1);
        let center = Voxel::new(3, 3, 0);
        lattice.set_id(center, 1);
        lattice.set_id(Voxel::new(3, 2, 0), 1);
        lattice.set_id(Voxel::new(4, 2, 0), 1);
        let w = lattice.window(center, 1);
        assert!(w.get(0, -1, 0));
        assert!(w.get(1, -1, 0));
        assert!(!w.get(0, 0, 0));
        assert_eq!(w.face_links(Topology::Planar), 1);
    }

    #[test]
    fn test_region_window_requires_both() {
        let mut lattice = Lattice::new(5, 5, 1);
        let v = Voxel::new(2, 2, 0);
        lattice.set_id(Voxel::new(2, 3, 0), 1);
        lattice.set_region(Voxel::new(2, 3, 0), Region::Nucleus);
        lattice.set_id(Voxel::new(3, 2, 0), 1);
        lattice.set_region(Voxel::new(3, 2, 0), Region::Default);
        let w = lattice.region_window(v, 1, Region::Nucleus);
        assert!(w.get(0, 1, 0));
        assert!(!w.get(1, 0, 0));
    }

    #[test]
    fn test_digest_tracks_changes() {
        let mut lattice = Lattice::new(4, 4, 1);
        let before = lattice.digest();
        assert_eq!(before, Lattice::new(4, 4, 1).digest());
        lattice.set_id(Voxel::new(2, 2, 0), 3);
        assert_ne!(before, lattice.digest());
    }

    #[test]
    fn test_border_clear() {
        let mut lattice = Lattice::new(3, 3, 3);
        assert!(lattice.border_is_clear());
        lattice.set_id(Voxel::new(2, 2, 2), 1);
        assert!(lattice.border_is_clear());
    }
}
