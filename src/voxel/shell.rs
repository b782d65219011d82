//! Integer-distance shells around an origin
//!
//! A shell at distance `d` is every cell whose Euclidean distance to the
//! origin, truncated toward zero, equals `d`. Shell 0 is the origin itself,
//! and shells 0, 1, 2, ... tile a filled ball. Enumeration scans the
//! `(2d+1)`-sided bounding box clipped to the grid, z outer, then y, then x.

use crate::core::{distance_2d, distance_3d, UVec3};
use super::atom::Atom;
use super::model::VoxelModel;

/// Iterator over the coordinates of a 3D shell
#[derive(Clone, Debug)]
pub struct Shell3d {
    origin: UVec3,
    distance: u32,
    lo: UVec3,
    hi: UVec3,
    cursor: Option<UVec3>,
}

/// Clip `[c - d, c + d]` to `[0, size)`; `None` if the range misses the grid
fn clip_axis(c: u32, d: u32, size: u32) -> Option<(u32, u32)> {
    let lo = c.saturating_sub(d);
    let hi = c.saturating_add(d).min(size.saturating_sub(1));
    (size > 0 && lo <= hi).then_some((lo, hi))
}

impl Shell3d {
    /// Shell around `origin` at `distance` inside a grid of `dims`
    pub fn new(origin: UVec3, distance: u32, dims: UVec3) -> Self {
        let bounds = clip_axis(origin.x, distance, dims.x)
            .zip(clip_axis(origin.y, distance, dims.y))
            .zip(clip_axis(origin.z, distance, dims.z));
        match bounds {
            Some((((lx, hx), (ly, hy)), (lz, hz))) => {
                let lo = UVec3::new(lx, ly, lz);
                Self { origin, distance, lo, hi: UVec3::new(hx, hy, hz), cursor: Some(lo) }
            }
            None => Self { origin, distance, lo: UVec3::ZERO, hi: UVec3::ZERO, cursor: None },
        }
    }

    fn advance(&mut self, c: UVec3) {
        self.cursor = if c.x < self.hi.x {
            Some(UVec3::new(c.x + 1, c.y, c.z))
        } else if c.y < self.hi.y {
            Some(UVec3::new(self.lo.x, c.y + 1, c.z))
        } else if c.z < self.hi.z {
            Some(UVec3::new(self.lo.x, self.lo.y, c.z + 1))
        } else {
            None
        };
    }
}

impl Iterator for Shell3d {
    type Item = UVec3;

    fn next(&mut self) -> Option<UVec3> {
        loop {
            let c = self.cursor?;
            self.advance(c);
            if distance_3d(c, self.origin) as u32 == self.distance {
                return Some(c);
            }
        }
    }
}

/// Iterator over a 2D ring in the horizontal plane at a fixed z
#[derive(Clone, Debug)]
pub struct Shell2d {
    origin_x: u32,
    origin_y: u32,
    z: u32,
    distance: u32,
    lo: (u32, u32),
    hi: (u32, u32),
    cursor: Option<(u32, u32)>,
}

impl Shell2d {
    pub fn new(origin_x: u32, origin_y: u32, z: u32, distance: u32, dims: UVec3) -> Self {
        let bounds = clip_axis(origin_x, distance, dims.x)
            .zip(clip_axis(origin_y, distance, dims.y))
            .filter(|_| z < dims.z);
        let (lo, hi, cursor) = match bounds {
            Some(((lx, hx), (ly, hy))) => ((lx, ly), (hx, hy), Some((lx, ly))),
            None => ((0, 0), (0, 0), None),
        };
        Self { origin_x, origin_y, z, distance, lo, hi, cursor }
    }
}

impl Iterator for Shell2d {
    type Item = UVec3;

    fn next(&mut self) -> Option<UVec3> {
        loop {
            let (x, y) = self.cursor?;
            self.cursor = if x < self.hi.0 {
                Some((x + 1, y))
            } else if y < self.hi.1 {
                Some((self.lo.0, y + 1))
            } else {
                None
            };
            if distance_2d(x, y, self.origin_x, self.origin_y) as u32 == self.distance {
                return Some(UVec3::new(x, y, self.z));
            }
        }
    }
}

/// Smallest distance whose shell lies entirely outside the grid
pub fn max_shell_distance(origin: UVec3, dims: UVec3) -> u32 {
    let far = UVec3::new(
        origin.x.max(dims.x.saturating_sub(1) - origin.x.min(dims.x.saturating_sub(1))),
        origin.y.max(dims.y.saturating_sub(1) - origin.y.min(dims.y.saturating_sub(1))),
        origin.z.max(dims.z.saturating_sub(1) - origin.z.min(dims.z.saturating_sub(1))),
    );
    distance_3d(far, UVec3::ZERO) as u32 + 1
}

impl VoxelModel {
    /// Visit every cell at truncated distance `distance` from `origin`
    pub fn map_atoms_at_distance_3d<F>(&mut self, origin: UVec3, distance: u32, mut f: F)
    where
        F: FnMut(UVec3, &mut Atom),
    {
        for c in Shell3d::new(origin, distance, self.dims()) {
            f(c, self.atom_mut(c.x, c.y, c.z));
        }
    }

    /// Visit every cell of the z-plane at truncated distance `distance` from `(origin_x, origin_y)`
    pub fn map_atoms_at_distance_2d_z<F>(&mut self, origin_x: u32, origin_y: u32, z: u32, distance: u32, mut f: F)
    where
        F: FnMut(UVec3, &mut Atom),
    {
        for c in Shell2d::new(origin_x, origin_y, z, distance, self.dims()) {
            f(c, self.atom_mut(c.x, c.y, c.z));
        }
    }

    /// Coordinates of a 3D shell, in visiting order
    pub fn atoms_at_distance_3d(&self, origin: UVec3, distance: u32) -> Vec<UVec3> {
        Shell3d::new(origin, distance, self.dims()).collect()
    }
}
