//! A single simulated water body

use crate::core::UVec3;
use crate::voxel::{Material, Rgb, VoxelModel};
use super::placement::PlacementError;

/// Hard cap on cells held by one drop
pub const MAX_ATOMS_PER_DROP: usize = 128;

/// One drop of water: a bounded set of water cells plus its calcite load
///
/// While active, every listed coordinate is a water cell in the model.
#[derive(Clone, Debug)]
pub struct Droplet {
    pub(super) active: bool,
    pub(super) index: u32,
    pub(super) generation: u32,
    size: u32,
    calcite: f64,
    calcite_color: Rgb,
    atoms: Vec<UVec3>,
}

impl Default for Droplet {
    fn default() -> Self {
        Self {
            active: false,
            index: 0,
            generation: 0,
            size: 0,
            calcite: 0.0,
            calcite_color: Rgb::WHITE,
            atoms: Vec::new(),
        }
    }
}

impl Droplet {
    /// Return the slot to a blank state, keeping its allocation
    pub(super) fn reset(&mut self) {
        self.size = 0;
        self.calcite = 0.0;
        self.calcite_color = Rgb::WHITE;
        self.atoms.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Slot index in the drop table
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Target number of water cells
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Set the target size; sizes over [`MAX_ATOMS_PER_DROP`] are refused
    pub fn set_size(&mut self, size: u32) -> Result<(), PlacementError> {
        if size as usize > MAX_ATOMS_PER_DROP {
            return Err(PlacementError::Oversized { size, max: MAX_ATOMS_PER_DROP });
        }
        self.size = size;
        Ok(())
    }

    /// Number of cells currently held
    pub fn natoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn atoms(&self) -> &[UVec3] {
        &self.atoms
    }

    /// Calcite fraction, 0..=1
    pub fn calcite(&self) -> f64 {
        self.calcite
    }

    pub fn set_calcite(&mut self, calcite: f64) {
        self.calcite = calcite.clamp(0.0, 1.0);
    }

    pub fn calcite_color(&self) -> Rgb {
        self.calcite_color
    }

    pub fn set_calcite_color(&mut self, color: Rgb) {
        self.calcite_color = color;
    }

    /// Record a cell that the caller has just turned into water
    pub(crate) fn push_atom(&mut self, c: UVec3) {
        assert!(
            self.atoms.len() < self.size as usize,
            "drop {} already holds its {} atoms",
            self.index, self.size
        );
        self.atoms.push(c);
    }

    /// Forget cells from `len` onwards and turn them back into air
    pub(crate) fn truncate_atoms(&mut self, model: &mut VoxelModel, len: usize) {
        for c in self.atoms.drain(len..) {
            model.set_material_at(c, Material::Air);
        }
    }

    /// Turn every cell back into air
    pub fn clear_atoms(&mut self, model: &mut VoxelModel) {
        self.truncate_atoms(model, 0);
    }

    /// First atom with the largest z (gravity points towards +z)
    pub fn lowest_atom(&self) -> Option<UVec3> {
        self.atoms
            .iter()
            .copied()
            .fold(None, |lowest: Option<UVec3>, c| match lowest {
                Some(l) if l.z >= c.z => Some(l),
                _ => Some(c),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_with(atoms: &[(u32, u32, u32)], model: &mut VoxelModel) -> Droplet {
        let mut drop = Droplet::default();
        drop.set_size(atoms.len() as u32).unwrap();
        for &(x, y, z) in atoms {
            model.set_material(x, y, z, Material::Water);
            drop.push_atom(UVec3::new(x, y, z));
        }
        drop
    }

    #[test]
    fn test_size_cap() {
        let mut drop = Droplet::default();
        assert!(drop.set_size(MAX_ATOMS_PER_DROP as u32).is_ok());
        assert!(matches!(
            drop.set_size(MAX_ATOMS_PER_DROP as u32 + 1),
            Err(PlacementError::Oversized { .. })
        ));
        assert_eq!(drop.size(), MAX_ATOMS_PER_DROP as u32);
    }

    #[test]
    fn test_calcite_is_clamped() {
        let mut drop = Droplet::default();
        drop.set_calcite(1.5);
        assert_eq!(drop.calcite(), 1.0);
        drop.set_calcite(-0.1);
        assert_eq!(drop.calcite(), 0.0);
    }

    #[test]
    fn test_lowest_atom_prefers_first_of_deepest() {
        let mut model = VoxelModel::new(1000, 5, 5, 5).unwrap();
        let drop = drop_with(&[(1, 1, 1), (2, 1, 3), (3, 1, 3), (1, 2, 2)], &mut model);
        assert_eq!(drop.lowest_atom(), Some(UVec3::new(2, 1, 3)));
        assert_eq!(Droplet::default().lowest_atom(), None);
    }

    #[test]
    fn test_clear_atoms_restores_air() {
        let mut model = VoxelModel::new(1000, 5, 5, 5).unwrap();
        let mut drop = drop_with(&[(1, 1, 1), (2, 1, 1)], &mut model);
        assert_eq!(model.count_material(Material::Water), 2);

        drop.clear_atoms(&mut model);
        assert_eq!(drop.natoms(), 0);
        assert_eq!(model.count_material(Material::Water), 0);
    }

    #[test]
    #[should_panic(expected = "already holds")]
    fn test_push_beyond_size_panics() {
        let mut drop = Droplet::default();
        drop.set_size(1).unwrap();
        drop.push_atom(UVec3::ZERO);
        drop.push_atom(UVec3::ONE);
    }
}
