//! Putting a drop's water into the model
//!
//! [`place`] fills free cells in growing shells around an origin and rolls
//! back everything it added if the drop cannot be completed.
//! [`estimate_water_space`] is the cheap pre-check used before spawning or
//! splitting: it flows along y and x runs at one level and only descends
//! when that level is exhausted.

use thiserror::Error;

use crate::core::UVec3;
use crate::voxel::shell::{max_shell_distance, Shell3d};
use crate::voxel::{Material, VoxelModel};
use super::droplet::Droplet;

/// Recoverable placement failures; callers count these
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("drop of {size} atoms exceeds the limit of {max}")]
    Oversized { size: u32, max: usize },

    #[error("only {placed} of {wanted} atoms fit around the origin")]
    NoSpace { placed: usize, wanted: u32 },
}

/// Fill the drop up to its size with free cells around `origin`
///
/// Shells are visited at distance 0, 1, 2, ... and non-free cells are
/// skipped, so the origin itself need not be free. On failure every cell
/// added by this call is turned back into air and the drop is left as it
/// was.
pub fn place(model: &mut VoxelModel, origin: UVec3, drop: &mut Droplet) -> Result<(), PlacementError> {
    let wanted = drop.size();
    let start = drop.natoms();
    let dims = model.dims();

    for distance in 0..max_shell_distance(origin, dims) {
        if drop.natoms() >= wanted as usize {
            break;
        }
        for c in Shell3d::new(origin, distance, dims) {
            if drop.natoms() >= wanted as usize {
                break;
            }
            if model.is_free_at(c) {
                model.set_material_at(c, Material::Water);
                drop.push_atom(c);
            }
        }
    }

    if drop.natoms() < wanted as usize {
        let placed = drop.natoms() - start;
        drop.truncate_atoms(model, start);
        log::trace!("Placement at {} rolled back after {} of {} atoms", origin, placed, wanted);
        return Err(PlacementError::NoSpace { placed, wanted });
    }
    Ok(())
}

/// Result of the flow-based space estimate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceEstimate {
    /// Cells counted, in the order they were found
    pub cells: Vec<UVec3>,
    /// Whether `size` cells were found or the water would leave the model
    pub enough: bool,
}

struct Estimator<'a> {
    model: &'a VoxelModel,
    remaining: u32,
    cells: Vec<UVec3>,
}

impl Estimator<'_> {
    fn take(&mut self, x: u32, y: u32, z: u32) {
        self.cells.push(UVec3::new(x, y, z));
        self.remaining -= 1;
    }

    /// Count the free run along y from `(x, y0)`, towards 0 first
    fn take_y_runs(&mut self, x: u32, y0: u32, z: u32) {
        let mut y = y0;
        while self.remaining > 0 && y > 0 && self.model.is_free(x, y - 1, z) {
            y -= 1;
            self.take(x, y, z);
        }
        let mut y = y0;
        while self.remaining > 0 && y + 1 < self.model.y_size() && self.model.is_free(x, y + 1, z) {
            y += 1;
            self.take(x, y, z);
        }
    }

    /// Count one level: the origin column, then columns towards x = 0, then towards x_size
    fn take_level(&mut self, x0: u32, y0: u32, z: u32) {
        self.take(x0, y0, z);
        self.take_y_runs(x0, y0, z);

        let mut x = x0;
        while self.remaining > 0 && x > 0 && self.model.is_free(x - 1, y0, z) {
            x -= 1;
            self.take(x, y0, z);
            self.take_y_runs(x, y0, z);
        }
        let mut x = x0;
        while self.remaining > 0 && x + 1 < self.model.x_size() && self.model.is_free(x + 1, y0, z) {
            x += 1;
            self.take(x, y0, z);
            self.take_y_runs(x, y0, z);
        }
    }
}

/// Estimate whether `size` water cells fit at `origin`
///
/// Descends one level at a time below the origin's column while the count
/// is short. Running out of the model at the bottom counts as enough; an
/// obstructed origin column does not.
pub fn estimate_water_space(model: &VoxelModel, origin: UVec3, size: u32) -> SpaceEstimate {
    let mut est = Estimator { model, remaining: size, cells: Vec::with_capacity(size as usize) };
    let mut z = origin.z;

    while est.remaining > 0 {
        if z >= model.z_size() {
            return SpaceEstimate { cells: est.cells, enough: true };
        }
        if !model.is_free(origin.x, origin.y, z) {
            return SpaceEstimate { cells: est.cells, enough: false };
        }
        est.take_level(origin.x, origin.y, z);
        z += 1;
    }

    SpaceEstimate { cells: est.cells, enough: true }
}

/// Pre-check before spawning or splitting a drop
pub fn enough_space_for_water(model: &VoxelModel, origin: UVec3, size: u32) -> bool {
    estimate_water_space(model, origin, size).enough
}
