//! Cave tunnel below the rock slab
//!
//! In every x-z cross-section, everything from `start_z` down that lies
//! outside an ellipse becomes rock. The ellipse has two foci on one
//! horizontal line, a third of the inner width apart.

use rayon::prelude::*;

use crate::core::distance_2d;
use crate::voxel::{Atom, Material, Rgb, VoxelModel};
use super::config::CAVE_WALL_THICKNESS;

/// Tunnel geometry in the x-z plane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaveTunnel {
    pub left_focus: u32,
    pub right_focus: u32,
    pub center_z: u32,
    /// Sum of distances to both foci on the ellipse
    pub reach: f64,
}

impl CaveTunnel {
    /// Geometry for a tunnel below `start_z`; `None` when the model is too small
    pub fn new(x_size: u32, z_size: u32, start_z: u32) -> Option<Self> {
        let wall = CAVE_WALL_THICKNESS;
        let inner = x_size.checked_sub(2 * wall)?;
        let depth = z_size.checked_sub(start_z)?.checked_sub(wall)?;

        let center_z = start_z + depth / 2;
        let left_focus = wall + inner / 3;
        let middle = wall + inner / 2;
        let right_focus = wall + 2 * inner / 3;
        let reach = 3.0 * distance_2d(left_focus, center_z, middle, center_z);
        Some(Self { left_focus, right_focus, center_z, reach })
    }

    /// Whether `(x, z)` lies outside the tunnel
    pub fn is_wall(&self, x: u32, z: u32) -> bool {
        let to_left = distance_2d(x, z, self.left_focus, self.center_z);
        let to_right = distance_2d(x, z, self.right_focus, self.center_z);
        to_left + to_right > self.reach
    }
}

/// Fill everything below `start_z` outside the tunnel with rock
///
/// Returns the tunnel geometry, or `None` if the model has no room for it.
pub fn carve_cave_tunnel(model: &mut VoxelModel, start_z: u32) -> Option<CaveTunnel> {
    let tunnel = CaveTunnel::new(model.x_size(), model.z_size(), start_z)?;
    log::debug!(
        "Cave tunnel foci x={} and x={} at z={}, reach {:.1}",
        tunnel.left_focus, tunnel.right_focus, tunnel.center_z, tunnel.reach
    );

    let x_size = model.x_size() as usize;
    let plane = x_size * model.y_size() as usize;
    let rock = Atom::new(Material::Rock, Rgb::WHITE);
    let first = model.index(0, 0, start_z);

    model.atoms_mut()[first..]
        .par_chunks_mut(plane)
        .enumerate()
        .for_each(|(dz, cells)| {
            let z = start_z + dz as u32;
            for (i, atom) in cells.iter_mut().enumerate() {
                if tunnel.is_wall((i % x_size) as u32, z) {
                    *atom = rock;
                }
            }
        });

    for y in 0..model.y_size() {
        model.set_atom(tunnel.left_focus, y, tunnel.center_z, rock);
        model.set_atom(tunnel.right_focus, y, tunnel.center_z, rock);
    }
    Some(tunnel)
}
