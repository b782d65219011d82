//! Drop table - fixed-capacity slot arena for drops
//!
//! - Fixed capacity; allocation past it fails softly and the caller counts it
//! - Inactive slots below the high-water mark are recycled lowest-first
//! - Trailing inactive slots are compacted away on delete
//! - Handles carry a generation, so a handle to a recycled slot no longer resolves

use crate::voxel::VoxelModel;
use super::droplet::Droplet;

/// Default number of drop slots
pub const DEFAULT_DROP_TABLE_CAPACITY: usize = 1024;

/// Handle naming a drop slot for the lifetime of one drop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DropHandle {
    index: u32,
    generation: u32,
}

impl DropHandle {
    /// Slot index this handle names
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Fixed-capacity table of drop slots with a high-water mark
pub struct DropTable {
    /// Slot storage; grows up to capacity and is never shrunk
    slots: Vec<Droplet>,
    /// Maximum number of slots
    capacity: usize,
    /// High-water mark: slots at or above it are unused
    ndrops: usize,
}

impl DropTable {
    /// Create a table with the given capacity
    pub fn new(capacity: usize) -> Self {
        log::debug!("Created drop table with {} slots", capacity);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            ndrops: 0,
        }
    }

    /// Allocate a drop slot, recycling the lowest inactive slot first
    ///
    /// Returns `None` when every slot is in use.
    pub fn get_drop(&mut self) -> Option<DropHandle> {
        debug_assert!(self.ndrops <= self.capacity);

        if let Some(idx) = self.slots[..self.ndrops].iter().position(|d| !d.active) {
            return Some(self.activate(idx));
        }

        if self.ndrops < self.capacity {
            if self.slots.len() == self.ndrops {
                self.slots.push(Droplet::default());
            }
            let idx = self.ndrops;
            self.ndrops += 1;
            return Some(self.activate(idx));
        }

        log::trace!("Drop table full ({} slots)", self.capacity);
        None
    }

    fn activate(&mut self, idx: usize) -> DropHandle {
        let slot = &mut self.slots[idx];
        slot.reset();
        slot.active = true;
        slot.index = idx as u32;
        slot.generation = slot.generation.wrapping_add(1);
        DropHandle { index: slot.index, generation: slot.generation }
    }

    /// Mark a drop inactive and compact trailing inactive slots
    ///
    /// The drop must hold no atoms; use [`DropTable::release`] to free its
    /// cells at the same time. Panics on a stale handle.
    pub fn delete_drop(&mut self, handle: DropHandle) {
        let slot = self.get_mut(handle).expect("deleting a drop that is not live");
        assert!(
            slot.natoms() == 0,
            "drop {} still holds {} atoms",
            slot.index, slot.natoms()
        );
        slot.active = false;

        while self.ndrops > 0 && !self.slots[self.ndrops - 1].active {
            self.ndrops -= 1;
        }
    }

    /// Free a drop's cells in the model, then delete it
    pub fn release(&mut self, handle: DropHandle, model: &mut VoxelModel) {
        let slot = self.get_mut(handle).expect("releasing a drop that is not live");
        slot.clear_atoms(model);
        self.delete_drop(handle);
    }

    /// Resolve a handle to its drop, if it is still live
    pub fn get(&self, handle: DropHandle) -> Option<&Droplet> {
        self.slots
            .get(handle.index as usize)
            .filter(|d| d.active && d.generation == handle.generation)
    }

    /// Resolve a handle to its drop mutably, if it is still live
    pub fn get_mut(&mut self, handle: DropHandle) -> Option<&mut Droplet> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|d| d.active && d.generation == handle.generation)
    }

    /// Handles of all active drops, in slot order
    pub fn active_handles(&self) -> Vec<DropHandle> {
        self.active_drops()
            .map(|d| DropHandle { index: d.index, generation: d.generation })
            .collect()
    }

    /// Active drops, in slot order
    pub fn active_drops(&self) -> impl Iterator<Item = &Droplet> + '_ {
        self.slots[..self.ndrops].iter().filter(|d| d.active)
    }

    /// Number of active drops
    pub fn active_count(&self) -> usize {
        self.active_drops().count()
    }

    /// High-water mark
    pub fn ndrops(&self) -> usize {
        self.ndrops
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free the cells of every active drop and empty the table
    pub fn release_all(&mut self, model: &mut VoxelModel) {
        for handle in self.active_handles() {
            self.release(handle, model);
        }
        debug_assert_eq!(self.ndrops, 0);
    }
}

impl Default for DropTable {
    fn default() -> Self {
        Self::new(DEFAULT_DROP_TABLE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UVec3;
    use crate::voxel::Material;

    #[test]
    fn test_allocates_in_order_until_full() {
        let mut table = DropTable::new(2);
        let a = table.get_drop().unwrap();
        let b = table.get_drop().unwrap();
        assert_eq!((a.index(), b.index()), (0, 1));
        assert!(table.get_drop().is_none());
        assert_eq!(table.ndrops(), 2);
    }

    #[test]
    fn test_trailing_compaction_cascades() {
        let mut table = DropTable::new(3);
        let d0 = table.get_drop().unwrap();
        let d1 = table.get_drop().unwrap();
        let d2 = table.get_drop().unwrap();
        assert_eq!((d0.index(), d1.index(), d2.index()), (0, 1, 2));

        table.delete_drop(d2);
        assert_eq!(table.ndrops(), 2);
        table.delete_drop(d1);
        assert_eq!(table.ndrops(), 1);

        // Slot 0 stays live; the next allocation reuses slot 1
        assert!(table.get(d0).is_some());
        let next = table.get_drop().unwrap();
        assert_eq!(next.index(), 1);

        table.delete_drop(next);
        table.delete_drop(d0);
        assert_eq!(table.ndrops(), 0);
        assert_eq!(table.get_drop().unwrap().index(), 0);
    }

    #[test]
    fn test_interior_hole_is_recycled_first() {
        let mut table = DropTable::new(3);
        let _d0 = table.get_drop().unwrap();
        let d1 = table.get_drop().unwrap();
        let _d2 = table.get_drop().unwrap();

        table.delete_drop(d1);
        assert_eq!(table.ndrops(), 3);
        let again = table.get_drop().unwrap();
        assert_eq!(again.index(), 1);
        assert_eq!(table.get(again).unwrap().index(), 1);
    }

    #[test]
    fn test_stale_handle_does_not_resolve() {
        let mut table = DropTable::new(1);
        let first = table.get_drop().unwrap();
        table.delete_drop(first);
        let second = table.get_drop().unwrap();
        assert_eq!(first.index(), second.index());
        assert!(table.get(first).is_none());
        assert!(table.get(second).is_some());
    }

    #[test]
    fn test_recycled_slot_is_blank() {
        let mut table = DropTable::new(1);
        let h = table.get_drop().unwrap();
        {
            let d = table.get_mut(h).unwrap();
            d.set_size(4).unwrap();
            d.set_calcite(0.7);
        }
        table.delete_drop(h);
        let h = table.get_drop().unwrap();
        let d = table.get(h).unwrap();
        assert_eq!(d.size(), 0);
        assert_eq!(d.calcite(), 0.0);
        assert_eq!(d.natoms(), 0);
    }

    #[test]
    fn test_release_frees_cells() {
        let mut model = VoxelModel::new(1000, 4, 4, 4).unwrap();
        let mut table = DropTable::new(4);
        let h = table.get_drop().unwrap();
        {
            let d = table.get_mut(h).unwrap();
            d.set_size(1).unwrap();
            model.set_material(1, 1, 1, Material::Water);
            d.push_atom(UVec3::new(1, 1, 1));
        }

        table.release(h, &mut model);
        assert_eq!(model.count_material(Material::Water), 0);
        assert_eq!(table.ndrops(), 0);
    }

    #[test]
    #[should_panic(expected = "still holds")]
    fn test_delete_with_atoms_panics() {
        let mut table = DropTable::new(1);
        let h = table.get_drop().unwrap();
        let d = table.get_mut(h).unwrap();
        d.set_size(1).unwrap();
        d.push_atom(UVec3::ZERO);
        table.delete_drop(h);
    }

    #[test]
    fn test_active_slots_know_their_index() {
        let mut table = DropTable::new(8);
        let handles: Vec<_> = (0..6).map(|_| table.get_drop().unwrap()).collect();
        table.delete_drop(handles[1]);
        table.delete_drop(handles[4]);
        table.get_drop().unwrap();

        assert!(table.ndrops() <= table.capacity());
        for h in table.active_handles() {
            assert_eq!(table.get(h).unwrap().index(), h.index());
        }
        assert_eq!(table.active_count(), 5);
    }
}
