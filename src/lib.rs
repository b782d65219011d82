//! Drop tracer - cave formation by water drops dripping through voxel rock

pub mod core;
pub mod voxel;
pub mod droplet;
pub mod simulation;
pub mod generation;
pub mod export;
