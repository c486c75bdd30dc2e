//! Local topology test for single-voxel flips.
//!
//! A flip is allowed only if the voxels sharing the identity (or region)
//! under test stay simply connected. The test is local: it inspects the
//! 3×3 (planar) or 3×3×3 (volumetric) window around the flipped voxel and
//! classifies it by the number of face-adjacent members.
//!
//! Zero, one and two members, and the fully surrounded case, are shared by
//! both topologies. The remaining cases walk the face/corner tables per
//! orthogonal plane.

use crate::topology::Topology;

/// In-plane face offsets as `(a, b)`, clockwise from north.
const PLANE_A: [i32; 4] = [0, 1, 0, -1];
const PLANE_B: [i32; 4] = [-1, 0, 1, 0];

/// In-plane corner offsets; corner `i` sits between faces `i` and `i + 1`.
const CORNER_A: [i32; 4] = [1, 1, -1, -1];
const CORNER_B: [i32; 4] = [-1, 1, 1, -1];

const NUMBER_PLANE: usize = 4;

#[inline(always)]
const fn next(i: usize, k: usize) -> usize {
    (i + k) % NUMBER_PLANE
}

/// Membership window around a voxel, indexed by `(dz, dx, dy)` offsets.
///
/// Planar lattices only populate the `dz = 0` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    cells: [[[bool; 3]; 3]; 3],
}

impl Window {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a window by evaluating `member(dx, dy, dz)` over the Moore
    /// offsets of `topology`. The center is left unset.
    pub fn from_fn<F>(topology: Topology, mut member: F) -> Self
    where
        F: FnMut(i32, i32, i32) -> bool,
    {
        let mut window = Self::default();
        for &(dx, dy, dz) in topology.moore_offsets() {
            if member(dx, dy, dz) {
                window.set(dx, dy, dz, true);
            }
        }
        window
    }

    #[inline]
    pub fn set(&mut self, dx: i32, dy: i32, dz: i32, value: bool) {
        self.cells[(dz + 1) as usize][(dx + 1) as usize][(dy + 1) as usize] = value;
    }

    #[inline]
    #[must_use]
    pub fn get(&self, dx: i32, dy: i32, dz: i32) -> bool {
        self.at(dz, dx, dy)
    }

    /// Raw access in `(z, x, y)` order.
    #[inline(always)]
    fn at(&self, z: i32, x: i32, y: i32) -> bool {
        self.cells[(z + 1) as usize][(x + 1) as usize][(y + 1) as usize]
    }

    #[must_use]
    pub fn face_links(&self, topology: Topology) -> usize {
        topology
            .face_offsets()
            .iter()
            .filter(|&&(dx, dy, dz)| self.get(dx, dy, dz))
            .count()
    }

    // Plane accessors. `c` is the offset along the plane normal.

    #[inline(always)]
    fn xy(&self, a: i32, b: i32, c: i32) -> bool {
        self.at(c, a, b)
    }

    #[inline(always)]
    fn yz(&self, a: i32, b: i32, c: i32) -> bool {
        self.at(b, c, a)
    }

    #[inline(always)]
    fn zx(&self, a: i32, b: i32, c: i32) -> bool {
        self.at(a, b, c)
    }

    #[inline(always)]
    fn north(&self) -> bool {
        self.at(0, 0, -1)
    }

    #[inline(always)]
    fn south(&self) -> bool {
        self.at(0, 0, 1)
    }

    #[inline(always)]
    fn west(&self) -> bool {
        self.at(0, -1, 0)
    }

    #[inline(always)]
    fn east(&self) -> bool {
        self.at(0, 1, 0)
    }

    #[inline(always)]
    fn down(&self) -> bool {
        self.at(-1, 0, 0)
    }

    #[inline(always)]
    fn up(&self) -> bool {
        self.at(1, 0, 0)
    }
}

/// Returns true if flipping the center voxel keeps the members of `window`
/// simply connected.
///
/// `zero` marks a center that does not currently belong to the set under
/// test; a fully surrounded center is accepted only in that case.
#[must_use]
pub fn is_connected(topology: Topology, window: &Window, zero: bool) -> bool {
    let links = window.face_links(topology);
    match links {
        0 => false,
        1 => true,
        2 => two_links(topology, window),
        n if n == topology.face_count() => zero,
        n => match topology {
            Topology::Planar => planar_three_links(window),
            Topology::Volumetric => match n {
                3 => volumetric_three_links(window),
                4 => volumetric_four_links(window),
                _ => volumetric_five_links(window).unwrap_or(zero),
            },
        },
    }
}

fn two_links(topology: Topology, w: &Window) -> bool {
    if w.north() && w.south() {
        return false;
    }
    if w.east() && w.west() {
        return false;
    }
    if w.up() && w.down() {
        return false;
    }

    for i in 0..NUMBER_PLANE {
        let j = next(i, 1);
        if w.xy(PLANE_A[i], PLANE_B[i], 0)
            && w.xy(PLANE_A[j], PLANE_B[j], 0)
            && w.xy(CORNER_A[i], CORNER_B[i], 0)
        {
            return true;
        }
        if !topology.is_volumetric() {
            continue;
        }
        if w.yz(PLANE_A[i], PLANE_B[i], 0)
            && w.yz(PLANE_A[j], PLANE_B[j], 0)
            && w.yz(CORNER_A[i], CORNER_B[i], 0)
        {
            return true;
        }
        if w.zx(PLANE_A[i], PLANE_B[i], 0)
            && w.zx(PLANE_A[j], PLANE_B[j], 0)
            && w.zx(CORNER_A[i], CORNER_B[i], 0)
        {
            return true;
        }
    }
    false
}

fn planar_three_links(w: &Window) -> bool {
    for i in 0..NUMBER_PLANE {
        if !w.xy(PLANE_A[i], PLANE_B[i], 0) {
            let (j, k) = (next(i, 1), next(i, 2));
            if w.xy(CORNER_A[j], CORNER_B[j], 0) && w.xy(CORNER_A[k], CORNER_B[k], 0) {
                return true;
            }
        }
    }
    false
}

fn volumetric_three_links(w: &Window) -> bool {
    for i in 0..NUMBER_PLANE {
        let (j, k) = (next(i, 1), next(i, 2));

        if !w.xy(PLANE_A[i], PLANE_B[i], 0)
            && !w.down()
            && !w.up()
            && w.xy(CORNER_A[j], CORNER_B[j], 0)
            && w.xy(CORNER_A[k], CORNER_B[k], 0)
        {
            return true;
        }

        if !w.yz(PLANE_A[i], PLANE_B[i], 0)
            && !w.west()
            && !w.east()
            && w.yz(CORNER_A[j], CORNER_B[j], 0)
            && w.yz(CORNER_A[k], CORNER_B[k], 0)
        {
            return true;
        }

        if !w.zx(PLANE_A[i], PLANE_B[i], 0)
            && !w.north()
            && !w.south()
            && w.zx(CORNER_A[j], CORNER_B[j], 0)
            && w.zx(CORNER_A[k], CORNER_B[k], 0)
        {
            return true;
        }

        // Two in-plane faces bridged through the layer above or below.
        if w.xy(PLANE_A[i], PLANE_B[i], 0) && w.xy(PLANE_A[j], PLANE_B[j], 0) {
            let corner = w.xy(CORNER_A[i], CORNER_B[i], 0);
            for (layer, present) in [(-1, w.down()), (1, w.up())] {
                let first = w.xy(PLANE_A[i], PLANE_B[i], layer);
                let second = w.xy(PLANE_A[j], PLANE_B[j], layer);
                let bridged = if corner {
                    first || second
                } else {
                    first && second
                };
                if present && bridged {
                    return true;
                }
            }
        }
    }
    false
}

fn count_corners<F: Fn(i32, i32) -> bool>(corner: F) -> usize {
    (0..NUMBER_PLANE)
        .filter(|&i| corner(CORNER_A[i], CORNER_B[i]))
        .count()
}

fn volumetric_four_links(w: &Window) -> bool {
    // All four members in one plane: need a ring of corners.
    if !w.down() && !w.up() {
        return count_corners(|a, b| w.xy(a, b, 0)) > 2;
    }
    if !w.west() && !w.east() {
        return count_corners(|a, b| w.yz(a, b, 0)) > 2;
    }
    if !w.north() && !w.south() {
        return count_corners(|a, b| w.zx(a, b, 0)) > 2;
    }

    // One opposite pair plus two adjacent faces in the orthogonal plane.
    let mut plane_a = [false; 2];
    let mut plane_b = [false; 2];
    let mut corner = false;

    for i in 0..NUMBER_PLANE {
        let j = next(i, 1);
        if w.west()
            && w.east()
            && w.yz(PLANE_A[i], PLANE_B[i], 0)
            && w.yz(PLANE_A[j], PLANE_B[j], 0)
        {
            plane_a = [
                w.yz(PLANE_A[i], PLANE_B[i], -1),
                w.yz(PLANE_A[i], PLANE_B[i], 1),
            ];
            plane_b = [
                w.yz(PLANE_A[j], PLANE_B[j], -1),
                w.yz(PLANE_A[j], PLANE_B[j], 1),
            ];
            corner = w.yz(CORNER_A[i], CORNER_B[i], 0);
            break;
        } else if w.north()
            && w.south()
            && w.zx(PLANE_A[i], PLANE_B[i], 0)
            && w.zx(PLANE_A[j], PLANE_B[j], 0)
        {
            plane_a = [
                w.zx(PLANE_A[i], PLANE_B[i], -1),
                w.zx(PLANE_A[i], PLANE_B[i], 1),
            ];
            plane_b = [
                w.zx(PLANE_A[j], PLANE_B[j], -1),
                w.zx(PLANE_A[j], PLANE_B[j], 1),
            ];
            corner = w.zx(CORNER_A[i], CORNER_B[i], 0);
        } else if w.down()
            && w.up()
            && w.xy(PLANE_A[i], PLANE_B[i], 0)
            && w.xy(PLANE_A[j], PLANE_B[j], 0)
        {
            plane_a = [
                w.xy(PLANE_A[i], PLANE_B[i], -1),
                w.xy(PLANE_A[i], PLANE_B[i], 1),
            ];
            plane_b = [
                w.xy(PLANE_A[j], PLANE_B[j], -1),
                w.xy(PLANE_A[j], PLANE_B[j], 1),
            ];
            corner = w.xy(CORNER_A[i], CORNER_B[i], 0);
        }
    }

    (plane_a[0] && plane_a[1] && (plane_b[0] || plane_b[1] || corner))
        || (plane_b[0] && plane_b[1] && (plane_a[0] || plane_a[1] || corner))
        || (corner && ((plane_a[0] && plane_b[1]) || (plane_a[1] && plane_b[0])))
}

/// Five members: one face is missing. Inspects the ring of corners around the
/// missing face's axis and the edges on the opposite side.
///
/// Returns `None` when no rule applies; the caller falls back to the
/// fully-surrounded rule.
fn volumetric_five_links(w: &Window) -> Option<bool> {
    let mut plane = [false; NUMBER_PLANE];
    let mut corner = [false; NUMBER_PLANE];

    if !w.down() || !w.up() {
        let z = if w.down() { -1 } else { 1 };
        for i in 0..NUMBER_PLANE {
            corner[i] = w.at(0, CORNER_A[i], CORNER_B[i]);
            plane[i] = w.at(z, PLANE_A[i], PLANE_B[i]);
        }
    } else if !w.west() || !w.east() {
        let x = if w.west() { -1 } else { 1 };
        for i in 0..NUMBER_PLANE {
            corner[i] = w.at(CORNER_A[i], 0, CORNER_B[i]);
            plane[i] = w.at(PLANE_A[i], x, PLANE_B[i]);
        }
    } else if !w.north() || !w.south() {
        let y = if w.north() { -1 } else { 1 };
        for i in 0..NUMBER_PLANE {
            corner[i] = w.at(CORNER_A[i], CORNER_B[i], 0);
            plane[i] = w.at(PLANE_A[i], PLANE_B[i], y);
        }
    }

    let n_plane = plane.iter().filter(|&&p| p).count();
    let n_corner = corner.iter().filter(|&&c| c).count();

    if n_corner + n_plane < 4 {
        return Some(false);
    }
    if n_plane == 4 || n_corner + n_plane > 5 {
        return Some(true);
    }
    if n_corner > 2 {
        return Some(n_plane > 0);
    }
    if n_corner == 1 && n_plane == 3 {
        let bridged = (0..NUMBER_PLANE)
            .any(|i| !plane[i] && (corner[i] || corner[next(i, 3)]));
        return Some(bridged);
    }
    if n_corner == 2 && n_plane == 2 {
        for i in 0..NUMBER_PLANE {
            if plane[i] && plane[next(i, 1)] {
                return Some(!corner[i]);
            }
            if plane[i] && plane[next(i, 2)] {
                return Some(
                    (!corner[i] || !corner[next(i, 1)])
                        && (!corner[next(i, 2)] || !corner[next(i, 3)]),
                );
            }
        }
    }
    if n_corner == 2 && n_plane == 3 {
        for i in 0..NUMBER_PLANE {
            if !plane[i] {
                return Some(corner[i] || corner[next(i, 3)]);
            }
        }
    }
    None
}
