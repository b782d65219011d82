//! Core types and utilities shared by the simulator

pub mod types;
pub mod error;
pub mod logging;

pub use types::*;
pub use error::Error;
