//! Periodic PNG snapshots during a run

use std::path::PathBuf;

use crate::core::{Error, Result};
use crate::simulation::{ProgressSink, SimulationStats};
use crate::voxel::{Plane, VoxelModel};
use super::image::write_plane_png;

/// Placeholder in the path template replaced by the zero-padded round
pub const ROUND_PLACEHOLDER: &str = "{round}";

/// Writes one plane of the model every `interval` rounds
#[derive(Clone, Debug)]
pub struct ProgressSnapshots {
    interval: u32,
    plane: Plane,
    template: String,
    written: usize,
}

impl ProgressSnapshots {
    pub fn new(interval: u32, plane: Plane, template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if interval == 0 {
            return Err(Error::Config("snapshot interval must be at least 1".into()));
        }
        if !template.contains(ROUND_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "snapshot path {template:?} has no {ROUND_PLACEHOLDER} placeholder"
            )));
        }
        Ok(Self { interval, plane, template, written: 0 })
    }

    pub fn path_for(&self, round: u32) -> PathBuf {
        PathBuf::from(self.template.replace(ROUND_PLACEHOLDER, &format!("{round:06}")))
    }

    /// Snapshots written so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl ProgressSink for ProgressSnapshots {
    fn on_round(&mut self, round: u32, model: &VoxelModel, stats: &SimulationStats) -> Result<()> {
        if round % self.interval != 0 {
            return Ok(());
        }
        let path = self.path_for(round);
        write_plane_png(model, self.plane, &path)?;
        self.written += 1;
        log::info!(
            "Round {}: snapshot {} ({} drops created, {} landed)",
            round,
            path.display(),
            stats.successfully_created_drops,
            stats.drops_landed
        );
        Ok(())
    }
}
