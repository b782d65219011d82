//! Spawning new drops on the rock surface

use rand::Rng;

use crate::core::{Error, Result, UVec3};
use crate::droplet::{enough_space_for_water, place, DropHandle, MoveContext};
use crate::voxel::VoxelModel;
use super::config::SimulationConfig;

/// Axis-aligned search direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    XPos,
    XNeg,
    YPos,
    YNeg,
    /// Downwards, into the rock
    ZPos,
    /// Upwards, towards the open space above
    ZNeg,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::XPos,
        Direction::XNeg,
        Direction::YPos,
        Direction::YNeg,
        Direction::ZPos,
        Direction::ZNeg,
    ];

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::ZPos | Direction::ZNeg)
    }

    /// Neighbor of `c` in this direction, or `None` at the grid edge
    fn step(self, c: UVec3, dims: UVec3) -> Option<UVec3> {
        match self {
            Direction::XPos => (c.x + 1 < dims.x).then(|| UVec3::new(c.x + 1, c.y, c.z)),
            Direction::XNeg => c.x.checked_sub(1).map(|x| UVec3::new(x, c.y, c.z)),
            Direction::YPos => (c.y + 1 < dims.y).then(|| UVec3::new(c.x, c.y + 1, c.z)),
            Direction::YNeg => c.y.checked_sub(1).map(|y| UVec3::new(c.x, y, c.z)),
            Direction::ZPos => (c.z + 1 < dims.z).then(|| UVec3::new(c.x, c.y, c.z + 1)),
            Direction::ZNeg => c.z.checked_sub(1).map(|z| UVec3::new(c.x, c.y, z)),
        }
    }
}

/// First z in column (0,0) holding rock
pub fn starting_level(model: &VoxelModel) -> Result<u32> {
    (0..model.z_size())
        .find(|&z| model.atom(0, 0, z).is_rock())
        .ok_or(Error::NoStartingLevel { x: 0, y: 0 })
}

/// Walk from `start` in `direction` until a free cell or the grid edge
pub fn walk_to_free(model: &VoxelModel, start: UVec3, direction: Direction) -> Option<UVec3> {
    let dims = model.dims();
    let mut c = start;
    loop {
        if model.is_free_at(c) {
            return Some(c);
        }
        c = direction.step(c, dims)?;
    }
}

/// Search for a free cell from `start`, trying `first` and then the other
/// horizontal directions in turn
pub fn find_hole(model: &VoxelModel, start: UVec3, first: Direction) -> Option<UVec3> {
    let offset = Direction::ALL.iter().position(|&d| d == first).unwrap_or(0);
    walk_to_free(model, start, first).or_else(|| {
        (1..Direction::ALL.len())
            .map(|k| Direction::ALL[(offset + k) % Direction::ALL.len()])
            .filter(|d| !d.is_vertical())
            .find_map(|d| walk_to_free(model, start, d))
    })
}

/// Try to create one drop at a random spot on the starting level
///
/// Every failure is counted in the context's stats and leaves the model
/// and table untouched.
pub fn spawn_drop<R: Rng + ?Sized>(
    ctx: &mut MoveContext<'_, R>,
    config: &SimulationConfig,
    level: u32,
) -> Option<DropHandle> {
    let start = UVec3::new(
        ctx.rng.gen_range(0..ctx.model.x_size()),
        ctx.rng.gen_range(0..ctx.model.y_size()),
        level,
    );
    let direction = Direction::ALL[ctx.rng.gen_range(0..Direction::ALL.len())];

    let Some(origin) = find_hole(ctx.model, start, direction) else {
        log::trace!("No hole found from {} heading {:?}", start, direction);
        ctx.stats.failed_drop_hole_finding += 1;
        return None;
    };

    let Some(handle) = ctx.table.get_drop() else {
        ctx.stats.failed_drop_allocations += 1;
        return None;
    };

    let drop = ctx.table.get_mut(handle).expect("drop was just allocated");
    if drop.set_size(config.drop_size).is_err() {
        ctx.table.release(handle, ctx.model);
        ctx.stats.failed_drop_oversize += 1;
        return None;
    }
    drop.set_calcite(config.initial_calcite);
    drop.set_calcite_color(config.calcite_color);

    let placed = enough_space_for_water(ctx.model, origin, config.drop_size)
        && place(ctx.model, origin, drop).is_ok();
    if !placed {
        ctx.table.release(handle, ctx.model);
        ctx.stats.failed_drop_hole_free += 1;
        return None;
    }

    log::debug!("Spawned drop {} of {} atoms at {}", handle.index(), config.drop_size, origin);
    ctx.stats.successfully_created_drops += 1;
    ctx.stats.atom_creations += config.drop_size as u64;
    Some(handle)
}
