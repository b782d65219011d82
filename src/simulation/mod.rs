//! Round-based simulation: configuration, spawning, the driver loop and its counters

pub mod config;
pub mod spawn;
pub mod driver;
pub mod stats;

pub use config::SimulationConfig;
pub use driver::{simulate, ProgressSink, Simulation};
pub use spawn::{find_hole, starting_level, Direction};
pub use stats::SimulationStats;
