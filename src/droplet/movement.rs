//! Per-round drop physics
//!
//! Each active drop is moved once per round. A drop that can move either
//! leaves the model, clings to rock beside it, or falls to the next ledge
//! below, where the impact speed decides whether it stays whole, splits
//! into fragments or disperses.

use rand::Rng;

use crate::core::{UVec3, GRAVITY};
use crate::simulation::SimulationStats;
use crate::voxel::{Material, Rgb, VoxelModel};
use super::droplet::Droplet;
use super::placement::{enough_space_for_water, place};
use super::table::{DropHandle, DropTable};

/// Impact speeds at or below this keep the drop whole (m/s)
pub const SPLIT_MIN_SPEED: f64 = 1.4;
/// Impact speeds at or above this always give the maximum split (m/s)
pub const SPLIT_MAX_SPEED: f64 = 14.0;
/// Fragments produced at maximum impact speed
pub const MAX_SPLIT: u32 = 10;
/// Fall height over which a full calcite load is likely to leave residue (m)
const RESIDUE_HEIGHT: f64 = 0.5;

/// What happened to a drop this round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing free below and not on the boundary
    Stuck,
    /// Touched the model boundary and was removed
    ExitedModel,
    /// Fell through the bottom of the model and was removed
    FellOff,
    /// Fell and landed whole
    Landed,
    /// Impact dispersed the drop entirely
    Dispersed,
    /// Impact split the drop; `fragments` of them were placed
    Split { fragments: u32 },
    /// Held in place by rock beside it
    Attached,
}

/// Footprint width of a drop of the given size
pub fn drop_width(size: u32) -> u32 {
    (size as f64 / 3.0).sqrt().max(1.0).round() as u32
}

/// Speed after a free fall of `height` model units (m/s)
pub fn impact_speed(height: u32, unit: u32) -> f64 {
    let meters = height as f64 / unit as f64;
    (2.0 * GRAVITY * meters).sqrt()
}

/// Number of pieces a drop breaks into on impact; 0 means it disperses
pub fn split_count<R: Rng + ?Sized>(speed: f64, size: u32, rng: &mut R) -> u32 {
    if speed <= SPLIT_MIN_SPEED || size <= 1 {
        1
    } else if speed >= SPLIT_MAX_SPEED {
        MAX_SPLIT
    } else {
        let span = (MAX_SPLIT - 2) as f64 * (speed - SPLIT_MIN_SPEED) / (SPLIT_MAX_SPEED - SPLIT_MIN_SPEED);
        rng.gen_range(0..2 + span as u32)
    }
}

/// Sizes of `pieces` fragments sharing `size` atoms
///
/// Each takes its share of what is left, so the last absorbs the remainder.
/// No fragment is smaller than one atom.
pub fn fragment_sizes(size: u32, pieces: u32) -> Vec<u32> {
    let mut remaining = size;
    (0..pieces)
        .map(|j| {
            let piece = (remaining / (pieces - j)).max(1);
            remaining = remaining.saturating_sub(piece);
            piece
        })
        .collect()
}

/// Level fragments are placed at: 0.1 m above the landing, at most half the fall
pub fn fragment_level(landing: u32, height: u32, unit: u32) -> u32 {
    landing - (unit / 10).min(height / 2)
}

/// Calcite fraction left after one residue from a drop of `natoms` atoms
pub fn calcite_after_residue(calcite: f64, natoms: usize) -> f64 {
    (calcite - 1.0 / natoms as f64).max(0.0)
}

/// A drop can move when any atom has air below it or sits on the boundary
pub fn can_move(model: &VoxelModel, drop: &Droplet) -> bool {
    drop.atoms()
        .iter()
        .any(|&c| model.is_on_boundary(c) || model.is_free(c.x, c.y, c.z + 1))
}

fn touches_boundary(model: &VoxelModel, drop: &Droplet) -> bool {
    drop.atoms().iter().any(|&c| model.is_on_boundary(c))
}

fn has_space_underneath(model: &VoxelModel, c: UVec3) -> bool {
    model.is_on_boundary(c) || model.is_free(c.x, c.y, c.z + 1)
}

/// Rock in the 8 cells around `c` in its z-plane
fn has_rock_alongside(model: &VoxelModel, c: UVec3) -> bool {
    (-1i64..=1).any(|dy| {
        (-1i64..=1).any(|dx| {
            let (x, y) = (c.x as i64 + dx, c.y as i64 + dy);
            (dx, dy) != (0, 0)
                && x >= 0
                && y >= 0
                && model.contains(x as u32, y as u32, c.z)
                && model.material_at(x as u32, y as u32, c.z) == Material::Rock
        })
    })
}

/// Whether the drop falls this round rather than clinging to rock
///
/// An atom with air below lets the drop fall unless some atom of the drop
/// in the same z-plane has rock beside it.
pub fn should_fall(model: &VoxelModel, drop: &Droplet) -> bool {
    drop.atoms().iter().any(|&c| {
        has_space_underneath(model, c)
            && (model.is_on_boundary(c)
                || !drop
                    .atoms()
                    .iter()
                    .filter(|other| other.z == c.z)
                    .any(|&other| has_rock_alongside(model, other)))
    })
}

/// Level a drop whose lowest atom is `lowest` comes to rest at
///
/// Scans down from the level below `lowest`, checking a `width`-square
/// footprint around it; returns the last fully free level, or `z_size` when
/// the scan runs out of the model.
pub fn landing_level(model: &VoxelModel, lowest: UVec3, width: u32) -> u32 {
    let before = width / 2;
    let after = width - before;
    let xs = lowest.x.saturating_sub(before)..(lowest.x + after).min(model.x_size());
    let ys = lowest.y.saturating_sub(before)..(lowest.y + after).min(model.y_size());

    let mut landing = lowest.z;
    for z in lowest.z + 1..model.z_size() {
        let blocked = ys
            .clone()
            .any(|y| xs.clone().any(|x| !model.is_free(x, y, z)));
        if blocked {
            return landing;
        }
        landing = z;
    }
    model.z_size()
}

/// Pick a value within `spread` of `center`, clipped to `[0, size)`
fn jitter<R: Rng + ?Sized>(rng: &mut R, center: u32, spread: u32, size: u32) -> u32 {
    let lo = center.saturating_sub(spread);
    let hi = center.saturating_add(spread).min(size - 1);
    rng.gen_range(lo..=hi)
}

/// Everything a move needs to mutate
pub struct MoveContext<'a, R: Rng + ?Sized> {
    pub model: &'a mut VoxelModel,
    pub table: &'a mut DropTable,
    pub stats: &'a mut SimulationStats,
    pub rng: &'a mut R,
}

impl<R: Rng + ?Sized> MoveContext<'_, R> {
    /// Advance one drop by one round. Panics if the handle is not live.
    pub fn move_drop(&mut self, handle: DropHandle) -> MoveOutcome {
        let drop = self.table.get(handle).expect("moving a drop that is not live");

        if !can_move(self.model, drop) {
            self.stats.drops_stuck += 1;
            return MoveOutcome::Stuck;
        }

        if touches_boundary(self.model, drop) {
            log::debug!("Drop {} left the model", handle.index());
            self.table.release(handle, self.model);
            self.stats.drops_exited_model += 1;
            return MoveOutcome::ExitedModel;
        }

        if !should_fall(self.model, drop) {
            // TODO: let attached drops flow along the rock surface
            self.stats.drops_attached += 1;
            return MoveOutcome::Attached;
        }

        self.fall(handle)
    }

    fn fall(&mut self, handle: DropHandle) -> MoveOutcome {
        let drop = self.table.get(handle).expect("moving a drop that is not live");
        let Some(lowest) = drop.lowest_atom() else {
            self.stats.drops_stuck += 1;
            return MoveOutcome::Stuck;
        };
        let size = drop.size();
        let natoms = drop.natoms();
        let mut calcite = drop.calcite();
        let color = drop.calcite_color();

        let landing = landing_level(self.model, lowest, drop_width(size));
        let height = landing - lowest.z;
        let height_m = self.model.units_to_meters(height);
        let speed = impact_speed(height, self.model.unit());

        let draw: f64 = self.rng.gen_range(0.0..1.0);
        if draw < calcite * natoms as f64 * (height_m / RESIDUE_HEIGHT) {
            calcite = calcite_after_residue(calcite, natoms);
            if let Some(drop) = self.table.get_mut(handle) {
                drop.set_calcite(calcite);
            }
            self.stats.calcite_residues += 1;
            log::trace!("Drop {} left calcite residue, {:.3} remaining", handle.index(), calcite);
        }

        if landing >= self.model.z_size() {
            log::debug!("Drop {} fell off the bottom from z={}", handle.index(), lowest.z);
            self.table.release(handle, self.model);
            self.stats.drops_fell_off += 1;
            return MoveOutcome::FellOff;
        }

        let pieces = split_count(speed, size, self.rng);
        log::debug!(
            "Drop {} fell {} units to z={} at {:.2} m/s, {} pieces",
            handle.index(), height, landing, speed, pieces
        );

        match pieces {
            0 => {
                self.table.release(handle, self.model);
                self.stats.drops_dispersed += 1;
                MoveOutcome::Dispersed
            }
            1 => {
                self.stats.drops_landed += 1;
                MoveOutcome::Landed
            }
            _ => {
                let target_z = fragment_level(landing, height, self.model.unit());
                let fragments = self.split(lowest, target_z, size, pieces, calcite, color);
                self.table.release(handle, self.model);
                self.stats.drops_split += 1;
                MoveOutcome::Split { fragments }
            }
        }
    }

    /// Spread `size` atoms over `pieces` new drops around the impact point
    fn split(
        &mut self,
        lowest: UVec3,
        target_z: u32,
        size: u32,
        pieces: u32,
        calcite: f64,
        color: Rgb,
    ) -> u32 {
        let spread = self.model.unit() / 10;
        let mut fragments = 0;

        for piece in fragment_sizes(size, pieces) {
            let Some(fragment) = self.table.get_drop() else {
                self.stats.failed_drop_allocations += 1;
                continue;
            };
            let target = UVec3::new(
                jitter(self.rng, lowest.x, spread, self.model.x_size()),
                jitter(self.rng, lowest.y, spread, self.model.y_size()),
                target_z,
            );

            let placed = {
                let drop = self.table.get_mut(fragment).expect("fragment was just allocated");
                drop.set_calcite(calcite);
                drop.set_calcite_color(color);
                drop.set_size(piece).is_ok()
                    && enough_space_for_water(self.model, target, piece)
                    && place(self.model, target, drop).is_ok()
            };

            if placed {
                self.stats.atom_creations += piece as u64;
                self.stats.spin_off_drops += 1;
                fragments += 1;
            } else {
                self.stats.failed_spinoff_space_finding += 1;
                self.table.release(fragment, self.model);
            }
        }
        fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::Atom;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct World {
        model: VoxelModel,
        table: DropTable,
        stats: SimulationStats,
    }

    impl World {
        fn new(unit: u32, x: u32, y: u32, z: u32) -> Self {
            Self {
                model: VoxelModel::new(unit, x, y, z).unwrap(),
                table: DropTable::new(64),
                stats: SimulationStats::default(),
            }
        }

        fn rock(&mut self, x: u32, y: u32, z: u32) {
            self.model.set_atom(x, y, z, Atom::new(Material::Rock, Rgb::WHITE));
        }

        fn rock_floor(&mut self, z: u32) {
            self.model.map_atoms_at_z(z, |_, atom| *atom = Atom::new(Material::Rock, Rgb::WHITE));
        }

        fn spawn(&mut self, origin: UVec3, size: u32) -> DropHandle {
            let h = self.table.get_drop().unwrap();
            let drop = self.table.get_mut(h).unwrap();
            drop.set_size(size).unwrap();
            place(&mut self.model, origin, drop).unwrap();
            h
        }

        fn step(&mut self, h: DropHandle) -> MoveOutcome {
            self.step_with(h, &mut StdRng::seed_from_u64(11))
        }

        fn step_with<R: Rng>(&mut self, h: DropHandle, rng: &mut R) -> MoveOutcome {
            let mut ctx = MoveContext {
                model: &mut self.model,
                table: &mut self.table,
                stats: &mut self.stats,
                rng,
            };
            ctx.move_drop(h)
        }

        fn water(&self) -> usize {
            self.model.count_material(Material::Water)
        }
    }

    #[test]
    fn test_drop_width() {
        assert_eq!(drop_width(1), 1);
        assert_eq!(drop_width(3), 1);
        assert_eq!(drop_width(12), 2);
        assert_eq!(drop_width(27), 3);
        assert_eq!(drop_width(128), 7);
    }

    #[test]
    fn test_short_fall_keeps_drop_whole() {
        let speed = impact_speed(20, 10_000);
        assert!((speed - 0.198).abs() < 1e-3, "speed {speed}");
        let mut rng = StdRng::seed_from_u64(1);
        for size in [1, 2, 50, 128] {
            assert_eq!(split_count(speed, size, &mut rng), 1);
        }
    }

    #[test]
    fn test_split_count_ranges() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(split_count(20.0, 40, &mut rng), MAX_SPLIT);
        assert_eq!(split_count(20.0, 1, &mut rng), 1);
        // 2 + floor(8 * 6.3 / 12.6) = 6
        for _ in 0..200 {
            assert!(split_count(7.7, 40, &mut rng) < 6);
        }
    }

    #[test]
    fn test_landing_level() {
        let mut world = World::new(1000, 7, 7, 10);
        world.rock_floor(6);
        assert_eq!(landing_level(&world.model, UVec3::new(3, 3, 1), 1), 5);

        // Rock inside a 3-wide footprint stops the scan earlier
        world.rock(2, 2, 4);
        assert_eq!(landing_level(&world.model, UVec3::new(3, 3, 1), 3), 3);
        assert_eq!(landing_level(&world.model, UVec3::new(3, 3, 1), 1), 5);

        // Nothing below reaches the floor of the model
        let open = VoxelModel::new(1000, 7, 7, 10).unwrap();
        assert_eq!(landing_level(&open, UVec3::new(3, 3, 1), 2), 10);
    }

    #[test]
    fn test_stuck_on_rock() {
        let mut world = World::new(1000, 7, 7, 7);
        world.rock(3, 3, 3);
        let h = world.spawn(UVec3::new(3, 3, 2), 1);

        assert_eq!(world.step(h), MoveOutcome::Stuck);
        assert_eq!(world.water(), 1);
        assert_eq!(world.stats.drops_stuck, 1);
    }

    #[test]
    fn test_boundary_exit_releases() {
        let mut world = World::new(1000, 7, 7, 7);
        let h = world.spawn(UVec3::new(0, 3, 2), 1);

        assert_eq!(world.step(h), MoveOutcome::ExitedModel);
        assert_eq!(world.water(), 0);
        assert!(world.table.get(h).is_none());
    }

    #[test]
    fn test_rock_alongside_holds_drop() {
        let mut world = World::new(1000, 7, 7, 7);
        world.rock(2, 3, 2);
        let h = world.spawn(UVec3::new(3, 3, 2), 1);

        assert_eq!(world.step(h), MoveOutcome::Attached);
        assert!(world.model.atom(3, 3, 2).is_water());
        assert_eq!(world.stats.drops_attached, 1);
    }

    #[test]
    fn test_short_fall_lands_in_place() {
        let mut world = World::new(1000, 7, 7, 7);
        world.rock_floor(5);
        let h = world.spawn(UVec3::new(3, 3, 2), 1);

        assert_eq!(world.step(h), MoveOutcome::Landed);
        assert!(world.model.atom(3, 3, 2).is_water());
        assert!(world.table.get(h).is_some());
    }

    #[test]
    fn test_open_column_falls_off() {
        let mut world = World::new(1000, 7, 7, 7);
        let h = world.spawn(UVec3::new(3, 3, 2), 1);

        assert_eq!(world.step(h), MoveOutcome::FellOff);
        assert_eq!(world.water(), 0);
        assert_eq!(world.table.ndrops(), 0);
    }

    #[test]
    fn test_zero_split_disperses() {
        // 20 cm fall: 1.98 m/s, split count drawn from 0..2
        let mut world = World::new(100, 7, 7, 40);
        world.rock_floor(25);
        let h = world.spawn(UVec3::new(3, 3, 4), 2);

        let outcome = world.step_with(h, &mut StepRng::new(0, 0));
        assert_eq!(outcome, MoveOutcome::Dispersed);
        assert_eq!(world.water(), 0);
        assert_eq!(world.stats.drops_dispersed, 1);
    }

    #[test]
    fn test_hard_impact_splits() {
        // One-meter cells: a 16 m fall always splits ten ways, with no jitter
        let mut world = World::new(1, 21, 21, 30);
        world.rock_floor(20);
        let h = world.spawn(UVec3::new(10, 10, 2), 10);

        let outcome = world.step(h);
        // Every fragment targets the same cell, so only the first fits
        assert_eq!(outcome, MoveOutcome::Split { fragments: 1 });
        assert!(world.table.get(h).is_none());
        assert_eq!(world.water(), 1);
        assert!(world.model.atom(10, 10, 19).is_water());
        assert_eq!(world.stats.spin_off_drops, 1);
        assert_eq!(world.stats.failed_spinoff_space_finding, 9);
        assert_eq!(world.table.active_count(), 1);
    }

    #[test]
    fn test_fragments_keep_invariants() {
        let mut world = World::new(10, 30, 30, 60);
        world.rock_floor(55);
        let h = world.spawn(UVec3::new(15, 15, 5), 40);
        world.table.get_mut(h).unwrap().set_calcite(0.5);

        for h in world.table.active_handles() {
            world.step(h);
        }
        for drop in world.table.active_drops() {
            assert!(drop.natoms() <= drop.size() as usize);
            assert!(drop.atoms().iter().all(|c| world.model.atom_at(*c).is_water()));
            assert!((0.0..=0.5).contains(&drop.calcite()));
        }
        let held: usize = world.table.active_drops().map(|d| d.natoms()).sum();
        assert_eq!(held, world.water());
    }

    #[test]
    fn test_small_drop_still_splits_ten_ways() {
        let mut world = World::new(1, 21, 21, 30);
        world.rock_floor(20);
        let h = world.spawn(UVec3::new(10, 10, 2), 4);

        assert_eq!(world.step(h), MoveOutcome::Split { fragments: 1 });
        let attempts = world.stats.spin_off_drops
            + world.stats.failed_spinoff_space_finding
            + world.stats.failed_drop_allocations;
        assert_eq!(attempts, MAX_SPLIT as u64);
        assert_eq!(world.water(), 1);
    }

    #[test]
    fn test_fragment_sizes() {
        assert_eq!(fragment_sizes(10, 3), vec![3, 3, 4]);
        assert_eq!(fragment_sizes(7, 2), vec![3, 4]);
        assert_eq!(fragment_sizes(12, 1), vec![12]);
        assert_eq!(fragment_sizes(4, 10), vec![1; 10]);
    }

    #[test]
    fn test_fragment_level() {
        // 0.1 m at 20 units per meter is 2 cells
        assert_eq!(fragment_level(219, 213, 20), 217);
        // Short falls rise at most half the height
        assert_eq!(fragment_level(50, 3, 1000), 49);
        assert_eq!(fragment_level(19, 17, 1), 19);
    }

    #[test]
    fn test_jitter_stays_on_grid() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            assert!((2..=6).contains(&jitter(&mut rng, 4, 2, 9)));
            assert!((0..=3).contains(&jitter(&mut rng, 1, 5, 4)));
            assert_eq!(jitter(&mut rng, 0, 0, 5), 0);
        }
    }

    #[test]
    fn test_residue_takes_one_atom_share() {
        assert!((calcite_after_residue(0.5, 10) - 0.4).abs() < 1e-12);
        assert_eq!(calcite_after_residue(0.05, 10), 0.0);
        assert_eq!(calcite_after_residue(1.0, 1), 0.0);
    }

    #[test]
    fn test_split_fragments_are_raised_and_jittered() {
        // 20 units per meter: 0.1 m is 2 cells, a 214-cell fall is over 14 m/s
        let mut world = World::new(20, 9, 9, 230);
        world.rock_floor(220);
        let h = world.spawn(UVec3::new(4, 4, 5), 10);
        world.table.get_mut(h).unwrap().set_calcite(0.5);
        let lowest = world.table.get(h).unwrap().lowest_atom().unwrap();
        assert_eq!(lowest, UVec3::new(4, 4, 5));

        let outcome = world.step_with(h, &mut StdRng::seed_from_u64(5));
        let MoveOutcome::Split { fragments } = outcome else {
            panic!("expected a split, got {outcome:?}");
        };
        assert!(fragments >= 1);
        assert_eq!(world.stats.spin_off_drops, fragments as u64);
        assert_eq!(
            world.stats.spin_off_drops + world.stats.failed_spinoff_space_finding,
            MAX_SPLIT as u64
        );
        assert_eq!(world.stats.calcite_residues, 1);
        assert!(world.table.get(h).is_none());

        for drop in world.table.active_drops() {
            assert_eq!(drop.size(), 1);
            let c = drop.atoms()[0];
            assert_eq!(c.z, 217);
            assert!(c.x.abs_diff(lowest.x) <= 2 && c.y.abs_diff(lowest.y) <= 2, "{c} too far from {lowest}");
            assert!((drop.calcite() - 0.4).abs() < 1e-12);
        }
        assert_eq!(world.water(), fragments as usize);
    }
}
