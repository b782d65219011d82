//! Water drops: the drop entity, its slot table, placement and physics

pub mod droplet;
pub mod table;
pub mod placement;
pub mod movement;

pub use droplet::{Droplet, MAX_ATOMS_PER_DROP};
pub use table::{DropHandle, DropTable, DEFAULT_DROP_TABLE_CAPACITY};
pub use placement::{enough_space_for_water, estimate_water_space, place, PlacementError, SpaceEstimate};
pub use movement::{MoveContext, MoveOutcome};
