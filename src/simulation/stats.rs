//! Simulation counters

use serde::{Deserialize, Serialize};

/// Aggregate counters for one simulation run
///
/// Recoverable failures (full table, oversized drop, no room to place)
/// never stop the round loop; they only show up here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Rounds completed
    pub rounds: u32,

    // Spawning
    pub successfully_created_drops: u64,
    pub failed_drop_hole_finding: u64,
    pub failed_drop_allocations: u64,
    pub failed_drop_oversize: u64,
    pub failed_drop_hole_free: u64,
    /// Water cells created by spawns and fragments
    pub atom_creations: u64,

    // Movement outcomes
    pub drops_stuck: u64,
    pub drops_exited_model: u64,
    pub drops_fell_off: u64,
    pub drops_landed: u64,
    pub drops_dispersed: u64,
    pub drops_split: u64,
    pub drops_attached: u64,
    pub calcite_residues: u64,

    // Splitting
    pub spin_off_drops: u64,
    pub failed_spinoff_space_finding: u64,

    /// Drops still in flight when the run ended
    pub active_drops_at_end: u64,
}

impl SimulationStats {
    /// All counted failures
    pub fn total_failures(&self) -> u64 {
        self.failed_drop_hole_finding
            + self.failed_drop_allocations
            + self.failed_drop_oversize
            + self.failed_drop_hole_free
            + self.failed_spinoff_space_finding
    }

    /// Log the counters at info level
    pub fn log_summary(&self) {
        log::info!("Simulation finished after {} rounds", self.rounds);
        log::info!(
            "  drops: {} created, {} spun off, {} still active",
            self.successfully_created_drops, self.spin_off_drops, self.active_drops_at_end
        );
        log::info!(
            "  failures: {} hole finding, {} allocation, {} oversize, {} no free space, {} spin-off space",
            self.failed_drop_hole_finding,
            self.failed_drop_allocations,
            self.failed_drop_oversize,
            self.failed_drop_hole_free,
            self.failed_spinoff_space_finding
        );
        log::info!(
            "  moves: {} stuck, {} exited, {} fell off, {} landed, {} dispersed, {} split, {} attached",
            self.drops_stuck,
            self.drops_exited_model,
            self.drops_fell_off,
            self.drops_landed,
            self.drops_dispersed,
            self.drops_split,
            self.drops_attached
        );
        log::info!(
            "  {} atoms created, {} calcite residues",
            self.atom_creations, self.calcite_residues
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_failures() {
        let stats = SimulationStats {
            failed_drop_hole_finding: 1,
            failed_drop_allocations: 2,
            failed_drop_hole_free: 3,
            failed_spinoff_space_finding: 4,
            drops_landed: 100,
            ..Default::default()
        };
        assert_eq!(stats.total_failures(), 10);
    }

    #[test]
    fn test_serializes_to_json() {
        let stats = SimulationStats { rounds: 7, successfully_created_drops: 3, ..Default::default() };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"rounds\":7"));
        let back: SimulationStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
