//! Character slices for logs and tests

use crate::voxel::{Material, Plane, VoxelModel};
use super::{plane_cell, plane_extent};

pub fn material_char(material: Material) -> char {
    match material {
        Material::Air => '.',
        Material::Rock => '#',
        Material::Water => '~',
    }
}

/// Render one plane as text, one line per row
pub fn plane_to_text(model: &VoxelModel, plane: Plane) -> String {
    let (width, height) = plane_extent(model, plane);
    let mut out = String::with_capacity((width as usize + 1) * height as usize);
    for row in 0..height {
        for col in 0..width {
            out.push(material_char(model.atom_at(plane_cell(plane, col, row)).material()));
        }
        out.push('\n');
    }
    out
}
