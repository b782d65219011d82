//! Dense voxel rock model

use crate::core::{Error, Result, UVec3};
use super::atom::{Atom, Material};

/// Axis-aligned plane through the model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
    X(u32),
    Y(u32),
    Z(u32),
}

impl std::str::FromStr for Plane {
    type Err = Error;

    /// Parse `x:N`, `y:N` or `z:N`
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::Config(format!("invalid plane {s:?}, expected x:N, y:N or z:N"));
        let (axis, at) = s.split_once(':').ok_or_else(bad)?;
        let at: u32 = at.trim().parse().map_err(|_| bad())?;
        match axis.trim() {
            "x" | "X" => Ok(Plane::X(at)),
            "y" | "Y" => Ok(Plane::Y(at)),
            "z" | "Z" => Ok(Plane::Z(at)),
            _ => Err(bad()),
        }
    }
}

/// Dense 3D grid of packed atoms
///
/// Cells are stored z-major (then y, then x). The length unit is in
/// fractions of a meter: 1000 means one cell is 1 mm.
#[derive(Clone, PartialEq, Eq)]
pub struct VoxelModel {
    unit: u32,
    x_size: u32,
    y_size: u32,
    z_size: u32,
    atoms: Vec<Atom>,
}

impl std::fmt::Debug for VoxelModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelModel")
            .field("unit", &self.unit)
            .field("size", &(self.x_size, self.y_size, self.z_size))
            .field("atoms", &"<cells>")
            .finish()
    }
}

/// Number of cells for the given dimensions, if it fits in memory indexing
pub(crate) fn cell_count(x: u32, y: u32, z: u32) -> Option<usize> {
    (x as usize)
        .checked_mul(y as usize)?
        .checked_mul(z as usize)
}

impl VoxelModel {
    /// Create a model filled with black air
    pub fn new(unit: u32, x_size: u32, y_size: u32, z_size: u32) -> Result<Self> {
        let invalid = Error::InvalidDimensions { unit, x: x_size, y: y_size, z: z_size };
        if unit == 0 || x_size == 0 || y_size == 0 || z_size == 0 {
            return Err(invalid);
        }
        let count = cell_count(x_size, y_size, z_size).ok_or(invalid)?;

        log::debug!(
            "Creating {}x{}x{} model ({} cells, unit 1/{} m)",
            x_size, y_size, z_size, count, unit
        );

        Ok(Self {
            unit,
            x_size,
            y_size,
            z_size,
            atoms: vec![Atom::AIR; count],
        })
    }

    /// Build from already-validated parts (used by the reader)
    pub(crate) fn from_parts(unit: u32, x_size: u32, y_size: u32, z_size: u32, atoms: Vec<Atom>) -> Self {
        debug_assert_eq!(cell_count(x_size, y_size, z_size), Some(atoms.len()));
        Self { unit, x_size, y_size, z_size, atoms }
    }

    /// Length unit in fractions of a meter
    pub fn unit(&self) -> u32 {
        self.unit
    }

    pub fn x_size(&self) -> u32 {
        self.x_size
    }

    pub fn y_size(&self) -> u32 {
        self.y_size
    }

    pub fn z_size(&self) -> u32 {
        self.z_size
    }

    /// Dimensions as a vector
    pub fn dims(&self) -> UVec3 {
        UVec3::new(self.x_size, self.y_size, self.z_size)
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Raw cell array
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Mutable raw cell array
    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    /// Convert a length in units to meters
    pub fn units_to_meters(&self, units: u32) -> f64 {
        units as f64 / self.unit as f64
    }

    /// Check if coordinates lie inside the grid
    pub fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        x < self.x_size && y < self.y_size && z < self.z_size
    }

    /// Flat index of a cell. Panics when out of bounds.
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        assert!(
            self.contains(x, y, z),
            "atom ({},{},{}) outside {}x{}x{} model",
            x, y, z, self.x_size, self.y_size, self.z_size
        );
        (z as usize * self.y_size as usize + y as usize) * self.x_size as usize + x as usize
    }

    /// Get the atom at a cell. Panics when out of bounds.
    pub fn atom(&self, x: u32, y: u32, z: u32) -> Atom {
        self.atoms[self.index(x, y, z)]
    }

    pub fn atom_at(&self, c: UVec3) -> Atom {
        self.atom(c.x, c.y, c.z)
    }

    /// Get a mutable atom. Panics when out of bounds.
    pub fn atom_mut(&mut self, x: u32, y: u32, z: u32) -> &mut Atom {
        let idx = self.index(x, y, z);
        &mut self.atoms[idx]
    }

    pub fn set_atom(&mut self, x: u32, y: u32, z: u32, atom: Atom) {
        *self.atom_mut(x, y, z) = atom;
    }

    pub fn material_at(&self, x: u32, y: u32, z: u32) -> Material {
        self.atom(x, y, z).material()
    }

    /// Check if a cell holds air
    pub fn is_free(&self, x: u32, y: u32, z: u32) -> bool {
        self.atom(x, y, z).is_free()
    }

    pub fn is_free_at(&self, c: UVec3) -> bool {
        self.is_free(c.x, c.y, c.z)
    }

    /// Change a cell's material, keeping its color
    pub fn set_material(&mut self, x: u32, y: u32, z: u32, material: Material) {
        self.atom_mut(x, y, z).set_material(material);
    }

    pub fn set_material_at(&mut self, c: UVec3, material: Material) {
        self.set_material(c.x, c.y, c.z, material);
    }

    /// True if the cell touches any face of the grid
    pub fn is_on_boundary(&self, c: UVec3) -> bool {
        c.z == 0 || c.z >= self.z_size - 1
            || c.x == 0 || c.x >= self.x_size - 1
            || c.y == 0 || c.y >= self.y_size - 1
    }

    /// Visit every cell
    pub fn map_atoms<F>(&mut self, mut f: F)
    where
        F: FnMut(UVec3, &mut Atom),
    {
        let (xs, ys) = (self.x_size, self.y_size);
        for z in 0..self.z_size {
            for y in 0..ys {
                for x in 0..xs {
                    let idx = self.index(x, y, z);
                    f(UVec3::new(x, y, z), &mut self.atoms[idx]);
                }
            }
        }
    }

    /// Visit every cell of a horizontal plane
    pub fn map_atoms_at_z<F>(&mut self, z: u32, f: F)
    where
        F: FnMut(UVec3, &mut Atom),
    {
        self.map_plane(Plane::Z(z), f);
    }

    /// Visit every cell of the plane at a fixed x
    pub fn map_atoms_at_x<F>(&mut self, x: u32, f: F)
    where
        F: FnMut(UVec3, &mut Atom),
    {
        self.map_plane(Plane::X(x), f);
    }

    /// Visit every cell of the plane at a fixed y
    pub fn map_atoms_at_y<F>(&mut self, y: u32, f: F)
    where
        F: FnMut(UVec3, &mut Atom),
    {
        self.map_plane(Plane::Y(y), f);
    }

    /// Visit every cell of an axis-aligned plane, z-major
    pub fn map_plane<F>(&mut self, plane: Plane, mut f: F)
    where
        F: FnMut(UVec3, &mut Atom),
    {
        let (xs, ys, zs) = (self.x_size, self.y_size, self.z_size);
        let (x_range, y_range, z_range) = match plane {
            Plane::X(x) => (x..x + 1, 0..ys, 0..zs),
            Plane::Y(y) => (0..xs, y..y + 1, 0..zs),
            Plane::Z(z) => (0..xs, 0..ys, z..z + 1),
        };
        for z in z_range {
            for y in y_range.clone() {
                for x in x_range.clone() {
                    let idx = self.index(x, y, z);
                    f(UVec3::new(x, y, z), &mut self.atoms[idx]);
                }
            }
        }
    }

    /// Count cells of a material
    pub fn count_material(&self, material: Material) -> usize {
        self.atoms.iter().filter(|a| a.material() == material).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::atom::Rgb;

    #[test]
    fn test_create_is_black_air() {
        let model = VoxelModel::new(1000, 4, 5, 6).unwrap();
        assert_eq!(model.len(), 4 * 5 * 6);
        assert_eq!(model.dims(), UVec3::new(4, 5, 6));
        assert!(model.atoms().iter().all(|a| *a == Atom::AIR));
    }

    #[test]
    fn test_create_rejects_zero_dims() {
        assert!(matches!(VoxelModel::new(1000, 0, 5, 6), Err(Error::InvalidDimensions { .. })));
        assert!(matches!(VoxelModel::new(0, 1, 1, 1), Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_index_layout() {
        let model = VoxelModel::new(1000, 4, 5, 6).unwrap();
        assert_eq!(model.index(0, 0, 0), 0);
        assert_eq!(model.index(1, 0, 0), 1);
        assert_eq!(model.index(0, 1, 0), 4);
        assert_eq!(model.index(0, 0, 1), 20);
        assert_eq!(model.index(3, 4, 5), model.len() - 1);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_panics() {
        let model = VoxelModel::new(1000, 2, 2, 2).unwrap();
        model.atom(2, 0, 0);
    }

    #[test]
    fn test_set_material_keeps_color() {
        let mut model = VoxelModel::new(1000, 3, 3, 3).unwrap();
        model.set_atom(1, 1, 1, Atom::new(Material::Rock, Rgb::WHITE));
        model.set_material(1, 1, 1, Material::Water);
        assert_eq!(model.material_at(1, 1, 1), Material::Water);
        assert_eq!(model.atom(1, 1, 1).color(), Rgb::WHITE);
        assert!(!model.is_free(1, 1, 1));
        assert!(model.is_free(0, 1, 1));
    }

    #[test]
    fn test_boundary() {
        let model = VoxelModel::new(1000, 5, 5, 5).unwrap();
        assert!(model.is_on_boundary(UVec3::new(0, 2, 2)));
        assert!(model.is_on_boundary(UVec3::new(2, 4, 2)));
        assert!(model.is_on_boundary(UVec3::new(2, 2, 4)));
        assert!(!model.is_on_boundary(UVec3::new(2, 2, 2)));
        assert!(!model.is_on_boundary(UVec3::new(1, 3, 3)));
    }

    #[test]
    fn test_map_atoms_visits_everything_in_order() {
        let mut model = VoxelModel::new(1000, 2, 3, 4).unwrap();
        let mut visited = Vec::new();
        model.map_atoms(|c, _| visited.push(c));
        assert_eq!(visited.len(), 24);
        assert_eq!(visited[0], UVec3::new(0, 0, 0));
        assert_eq!(visited[1], UVec3::new(1, 0, 0));
        assert_eq!(visited[2], UVec3::new(0, 1, 0));
        assert_eq!(visited[23], UVec3::new(1, 2, 3));
    }

    #[test]
    fn test_map_planes() {
        let mut model = VoxelModel::new(1000, 2, 3, 4).unwrap();
        model.map_atoms_at_z(2, |_, atom| atom.set_material(Material::Rock));
        assert_eq!(model.count_material(Material::Rock), 6);
        assert!((0..3).all(|y| (0..2).all(|x| model.material_at(x, y, 2) == Material::Rock)));

        let mut count = 0;
        model.map_atoms_at_x(1, |c, _| {
            assert_eq!(c.x, 1);
            count += 1;
        });
        assert_eq!(count, 12);

        count = 0;
        model.map_atoms_at_y(2, |c, _| {
            assert_eq!(c.y, 2);
            count += 1;
        });
        assert_eq!(count, 8);
    }

    #[test]
    fn test_parse_plane() {
        assert_eq!("y:12".parse::<Plane>().unwrap(), Plane::Y(12));
        assert_eq!("Z:0".parse::<Plane>().unwrap(), Plane::Z(0));
        assert!("w:3".parse::<Plane>().is_err());
        assert!("x".parse::<Plane>().is_err());
        assert!("x:-1".parse::<Plane>().is_err());
    }
}
