//! Slice exports of a model for inspection
//!
//! A plane is rendered row by row: horizontal planes (`Plane::Z`) put x
//! across and y down, vertical planes put their free axis across and z down,
//! so the top of the image is the top of the rock.

pub mod image;
pub mod text;
pub mod progress;

pub use self::image::{encode_plane_png, write_plane_png};
pub use self::text::{material_char, plane_to_text};
pub use self::progress::ProgressSnapshots;

use crate::core::{Error, Result, UVec3};
use crate::voxel::{Plane, VoxelModel};

/// Width and height of a plane's rendering
pub fn plane_extent(model: &VoxelModel, plane: Plane) -> (u32, u32) {
    match plane {
        Plane::X(_) => (model.y_size(), model.z_size()),
        Plane::Y(_) => (model.x_size(), model.z_size()),
        Plane::Z(_) => (model.x_size(), model.y_size()),
    }
}

/// Fail if the plane lies outside the model
pub fn check_plane(model: &VoxelModel, plane: Plane) -> Result<()> {
    let (at, size) = match plane {
        Plane::X(x) => (x, model.x_size()),
        Plane::Y(y) => (y, model.y_size()),
        Plane::Z(z) => (z, model.z_size()),
    };
    if at >= size {
        return Err(Error::Config(format!("{plane:?} is outside the model (size {size})")));
    }
    Ok(())
}

/// Model coordinate of a pixel in a plane's rendering
pub fn plane_cell(plane: Plane, col: u32, row: u32) -> UVec3 {
    match plane {
        Plane::X(x) => UVec3::new(x, col, row),
        Plane::Y(y) => UVec3::new(col, y, row),
        Plane::Z(z) => UVec3::new(col, row, z),
    }
}
