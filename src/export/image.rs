//! PNG slices

use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::core::Result;
use crate::voxel::{Material, Plane, Rgb, VoxelModel};
use super::{check_plane, plane_cell, plane_extent};

/// Display color of a cell: air black, rock its own color, water blue
fn pixel(model: &VoxelModel, plane: Plane, col: u32, row: u32) -> Rgb {
    let atom = model.atom_at(plane_cell(plane, col, row));
    match atom.material() {
        Material::Air => Rgb::BLACK,
        Material::Rock => atom.color(),
        Material::Water => Rgb::BLUE,
    }
}

/// Encode one plane as an RGB PNG, one pixel per cell
pub fn encode_plane_png(model: &VoxelModel, plane: Plane) -> Result<Vec<u8>> {
    check_plane(model, plane)?;
    let (width, height) = plane_extent(model, plane);
    let mut rgb8 = Vec::with_capacity(width as usize * height as usize * 3);
    for row in 0..height {
        for col in 0..width {
            let c = pixel(model, plane, col, row);
            rgb8.extend_from_slice(&[c.r, c.g, c.b]);
        }
    }

    let mut png_data = Vec::new();
    PngEncoder::new(&mut png_data).write_image(&rgb8, width, height, ExtendedColorType::Rgb8)?;
    Ok(png_data)
}

/// Write one plane as a PNG file, creating parent directories
pub fn write_plane_png(model: &VoxelModel, plane: Plane, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let png_data = encode_plane_png(model, plane)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, png_data)?;
    log::debug!("Wrote {:?} slice to {}", plane, path.display());
    Ok(())
}
