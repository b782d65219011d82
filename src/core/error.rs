//! Error types for the drop tracer

use thiserror::Error;

/// Main error type for the simulator
///
/// Everything here is fatal for a run: malformed input, unusable
/// configuration, or I/O failures. Recoverable simulation failures are
/// counted in [`crate::simulation::SimulationStats`] instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid model dimensions {x}x{y}x{z} with unit {unit}")]
    InvalidDimensions { unit: u32, x: u32, y: u32, z: u32 },

    #[error("model data too short: {len} bytes, header alone is {header} bytes")]
    Truncated { len: usize, header: usize },

    #[error("bad model magic {found:#010x}, expected {expected:#010x}")]
    BadMagic { found: u32, expected: u32 },

    #[error("model size mismatch: dimensions imply {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid atom byte {bits:#04x} at cell {offset}")]
    InvalidAtom { offset: usize, bits: u8 },

    #[error("no rock found in column ({x},{y}), cannot determine starting level")]
    NoStartingLevel { x: u32, y: u32 },

    #[error("Config error: {0}")]
    Config(String),
}
