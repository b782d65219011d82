//! Round-based simulation driver

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::Result;
use crate::droplet::{DropTable, MoveContext};
use crate::voxel::VoxelModel;
use super::config::SimulationConfig;
use super::spawn::{spawn_drop, starting_level};
use super::stats::SimulationStats;

/// Observer called after every round
pub trait ProgressSink {
    /// Called with the zero-based round just completed
    fn on_round(&mut self, round: u32, model: &VoxelModel, stats: &SimulationStats) -> Result<()>;
}

/// A simulation in progress over a borrowed model
///
/// Owns the drop table and the PRNG; every random decision of the run
/// comes from the one generator seeded from the config.
pub struct Simulation<'m> {
    model: &'m mut VoxelModel,
    config: SimulationConfig,
    table: DropTable,
    stats: SimulationStats,
    rng: StdRng,
    starting_level: u32,
    round: u32,
}

impl<'m> Simulation<'m> {
    /// Prepare a run; fails on an invalid config or a model without rock at (0,0)
    pub fn new(model: &'m mut VoxelModel, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let starting_level = starting_level(model)?;

        log::info!(
            "Simulating {} rounds on {}x{}x{} model: drop size {}, every {} rounds, starting level {}, seed {}",
            config.rounds,
            model.x_size(), model.y_size(), model.z_size(),
            config.drop_size,
            config.drop_frequency,
            starting_level,
            config.seed
        );

        Ok(Self {
            table: DropTable::new(config.drop_table_capacity),
            rng: StdRng::seed_from_u64(config.seed),
            model,
            config,
            stats: SimulationStats::default(),
            starting_level,
            round: 0,
        })
    }

    /// Move every drop once, then maybe spawn a new one
    pub fn run_round(&mut self) {
        let round = self.round;
        let mut ctx = MoveContext {
            model: &mut *self.model,
            table: &mut self.table,
            stats: &mut self.stats,
            rng: &mut self.rng,
        };

        // Fragments created this round are not in the snapshot
        for handle in ctx.table.active_handles() {
            if ctx.table.get(handle).is_some() {
                ctx.move_drop(handle);
            }
        }

        if round % self.config.drop_frequency == 0 {
            spawn_drop(&mut ctx, &self.config, self.starting_level);
        }

        self.round += 1;
        self.stats.rounds = self.round;
        if self.round % 1000 == 0 {
            log::debug!("Round {}: {} active drops", self.round, self.table.active_count());
        }
    }

    /// Rounds completed so far
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn starting_level(&self) -> u32 {
        self.starting_level
    }

    pub fn model(&self) -> &VoxelModel {
        &*self.model
    }

    pub fn table(&self) -> &DropTable {
        &self.table
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// End the run and return its counters
    ///
    /// Drops still in flight keep their water in the model.
    pub fn finish(mut self) -> SimulationStats {
        self.stats.active_drops_at_end = self.table.active_count() as u64;
        self.stats.log_summary();
        self.stats
    }
}

/// Run a full simulation over `model`
pub fn simulate(
    model: &mut VoxelModel,
    config: &SimulationConfig,
    mut progress: Option<&mut dyn ProgressSink>,
) -> Result<SimulationStats> {
    let mut sim = Simulation::new(model, config.clone())?;
    for round in 0..config.rounds {
        sim.run_round();
        if let Some(sink) = progress.as_mut() {
            sink.on_round(round, sim.model(), sim.stats())?;
        }
    }
    Ok(sim.finish())
}
