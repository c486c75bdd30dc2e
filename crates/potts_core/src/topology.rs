//! Neighbor topology descriptors for planar and volumetric lattices.
//!
//! Every per-voxel neighbor scan in the engine goes through [`Topology`]:
//! candidate selection, surface bookkeeping, adhesion and the connectivity
//! window all read the same offset tables.

use potts_data::Voxel;
use serde::{Deserialize, Serialize};

/// Offset as `(dx, dy, dz)`.
pub type Offset = (i32, i32, i32);

/// Face offsets in scan order: north, east, south, west.
const FACES_PLANAR: [Offset; 4] = [(0, -1, 0), (1, 0, 0), (0, 1, 0), (-1, 0, 0)];

/// Planar faces followed by up and down.
const FACES_VOLUMETRIC: [Offset; 6] = [
    (0, -1, 0),
    (1, 0, 0),
    (0, 1, 0),
    (-1, 0, 0),
    (0, 0, 1),
    (0, 0, -1),
];

const MOORE_PLANAR: [Offset; 8] = moore::<8>(false);
const MOORE_VOLUMETRIC: [Offset; 26] = moore::<26>(true);

const fn moore<const N: usize>(volumetric: bool) -> [Offset; N] {
    let mut out = [(0, 0, 0); N];
    let mut n = 0;
    let mut dz = if volumetric { -1 } else { 0 };
    let dz_max = if volumetric { 1 } else { 0 };
    while dz <= dz_max {
        let mut dx = -1;
        while dx <= 1 {
            let mut dy = -1;
            while dy <= 1 {
                if !(dx == 0 && dy == 0 && dz == 0) {
                    out[n] = (dx, dy, dz);
                    n += 1;
                }
                dy += 1;
            }
            dx += 1;
        }
        dz += 1;
    }
    out
}

/// Lattice dimensionality.
///
/// A lattice with a height of 1 is planar: z is pinned to 0 and only
/// in-plane neighbors exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    Planar,
    Volumetric,
}

impl Topology {
    #[must_use]
    pub const fn from_height(height: usize) -> Self {
        if height == 1 {
            Topology::Planar
        } else {
            Topology::Volumetric
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_volumetric(self) -> bool {
        matches!(self, Topology::Volumetric)
    }

    /// Face-adjacent offsets in scan order.
    #[inline]
    #[must_use]
    pub const fn face_offsets(self) -> &'static [Offset] {
        match self {
            Topology::Planar => &FACES_PLANAR,
            Topology::Volumetric => &FACES_VOLUMETRIC,
        }
    }

    /// Face, edge and corner offsets.
    #[inline]
    #[must_use]
    pub const fn moore_offsets(self) -> &'static [Offset] {
        match self {
            Topology::Planar => &MOORE_PLANAR,
            Topology::Volumetric => &MOORE_VOLUMETRIC,
        }
    }

    #[inline]
    #[must_use]
    pub const fn face_count(self) -> usize {
        self.face_offsets().len()
    }

    #[inline]
    #[must_use]
    pub const fn moore_count(self) -> usize {
        self.moore_offsets().len()
    }

    /// Face neighbors of `voxel` in scan order.
    #[inline]
    pub fn faces(self, voxel: Voxel) -> impl Iterator<Item = Voxel> {
        self.face_offsets()
            .iter()
            .map(move |&(dx, dy, dz)| voxel.offset(dx, dy, dz))
    }

    #[inline]
    pub fn moore(self, voxel: Voxel) -> impl Iterator<Item = Voxel> {
        self.moore_offsets()
            .iter()
            .map(move |&(dx, dy, dz)| voxel.offset(dx, dy, dz))
    }
}
