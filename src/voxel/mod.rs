//! Voxel rock model: packed atoms, the dense grid, shell queries and persistence

pub mod atom;
pub mod model;
pub mod shell;
pub mod io;

pub use atom::{Atom, Material, Rgb};
pub use model::{Plane, VoxelModel};
pub use shell::{Shell2d, Shell3d};
pub use io::{read_model, write_model, MODEL_MAGIC};
