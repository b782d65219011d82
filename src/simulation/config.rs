//! Simulation run configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::droplet::{DEFAULT_DROP_TABLE_CAPACITY, MAX_ATOMS_PER_DROP};
use crate::voxel::Rgb;

/// Parameters for one simulation run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of rounds to simulate
    pub rounds: u32,
    /// A new drop is spawned every `drop_frequency` rounds
    pub drop_frequency: u32,
    /// Atoms per spawned drop
    pub drop_size: u32,
    /// PRNG seed; the same seed and model give the same run
    pub seed: u64,
    /// Drop table slots
    pub drop_table_capacity: usize,
    /// Calcite fraction of a freshly spawned drop
    pub initial_calcite: f64,
    /// Color of the calcite a drop carries
    pub calcite_color: Rgb,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 1000,
            drop_frequency: 10,
            drop_size: 10,
            seed: 0x5EED,
            drop_table_capacity: DEFAULT_DROP_TABLE_CAPACITY,
            initial_calcite: 0.5,
            calcite_color: Rgb::WHITE,
        }
    }
}

impl SimulationConfig {
    /// Reject values the driver cannot run with
    ///
    /// Drop sizes above the per-drop cap are allowed; every spawn then
    /// fails and is counted as oversized.
    pub fn validate(&self) -> Result<()> {
        if self.drop_frequency == 0 {
            return Err(Error::Config("drop_frequency must be at least 1".into()));
        }
        if self.drop_size == 0 {
            return Err(Error::Config("drop_size must be at least 1".into()));
        }
        if self.drop_table_capacity == 0 {
            return Err(Error::Config("drop_table_capacity must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.initial_calcite) {
            return Err(Error::Config(format!(
                "initial_calcite {} is outside 0..=1",
                self.initial_calcite
            )));
        }
        if self.drop_size as usize > MAX_ATOMS_PER_DROP {
            log::warn!(
                "drop_size {} exceeds the per-drop limit of {}; no drop will spawn",
                self.drop_size, MAX_ATOMS_PER_DROP
            );
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}
