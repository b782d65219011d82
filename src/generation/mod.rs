//! Rock model generation
//!
//! Builds the starting model for a simulation:
//! 1. A horizontal rock slab below some free space
//! 2. A simple or fractal crack carved through the slab
//! 3. Optionally a cave tunnel below the slab

pub mod config;
pub mod crack;
pub mod cave;

pub use config::{CrackDirection, RockConfig, RockStyle};
pub use crack::{carve_crack, carve_fractal_crack, crack_width_table, CrackRegion, CrackWidth, FractalParams};
pub use cave::{carve_cave_tunnel, CaveTunnel};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::core::Result;
use crate::voxel::{Atom, Material, Rgb, VoxelModel};

/// Fill layers `z0..z0 + thickness` with white rock, one plane per task
pub fn fill_slab(model: &mut VoxelModel, z0: u32, thickness: u32) {
    let z_end = (z0 + thickness).min(model.z_size());
    if z0 >= z_end {
        return;
    }
    let plane = model.x_size() as usize * model.y_size() as usize;
    let start = z0 as usize * plane;
    let end = z_end as usize * plane;
    let rock = Atom::new(Material::Rock, Rgb::WHITE);

    model.atoms_mut()[start..end]
        .par_chunks_mut(plane)
        .for_each(|cells| cells.fill(rock));
}

/// Generate a rock model from a configuration
pub fn generate_rock(config: &RockConfig) -> Result<VoxelModel> {
    config.validate()?;

    let mut model = VoxelModel::new(config.unit, config.x_size, config.y_size, config.z_size)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let z0 = config.free_space();
    let thickness = config.thickness();

    log::info!(
        "Generating {}x{}x{} rock: {:?} crack along {:?}, slab z {}..{}{}",
        config.x_size, config.y_size, config.z_size,
        config.style,
        config.direction,
        z0,
        z0 + thickness,
        if config.cave { ", with cave" } else { "" }
    );

    fill_slab(&mut model, z0, thickness);

    match config.style {
        RockStyle::Simple => {
            let region = CrackRegion::whole(&model);
            let (length, span) = match config.direction {
                CrackDirection::Y => (model.y_size(), model.x_size()),
                CrackDirection::X => (model.x_size(), model.y_size()),
            };
            let table = crack_width_table(
                length,
                span,
                config.uniform,
                config.crack_width,
                config.crack_growth_steps,
                &mut rng,
            );
            carve_crack(&mut model, region, config.direction, &table, z0, thickness);
        }
        RockStyle::Fractal => {
            let params = FractalParams {
                uniform: config.uniform,
                crack_width: config.crack_width,
                growth: config.crack_growth_steps,
                shrink: config.fractal_shrink,
                levels: config.fractal_levels,
                cardinality: config.fractal_cardinality,
            };
            carve_fractal_crack(&mut model, config.direction, params, z0, thickness, &mut rng);
        }
    }

    if config.cave && carve_cave_tunnel(&mut model, config.slab_end()).is_none() {
        log::warn!("Model too small for a cave tunnel, skipped");
    }

    log::info!(
        "Generated rock: {} rock cells, {} air cells",
        model.count_material(Material::Rock),
        model.count_material(Material::Air)
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::simulation::starting_level;

    #[test]
    fn test_simple_uniform_crack() {
        let config = RockConfig { x_size: 20, y_size: 16, z_size: 40, crack_width: 4, ..Default::default() };
        let model = generate_rock(&config).unwrap();

        assert_eq!(model.count_material(Material::Rock), (20 - 4) * 16 * 10);
        for y in 0..16 {
            for z in 10..20 {
                assert!((8..12).all(|x| model.is_free(x, y, z)));
                assert!(model.atom(7, y, z).is_rock() && model.atom(12, y, z).is_rock());
            }
        }
        assert_eq!(starting_level(&model).unwrap(), 10);
    }

    #[test]
    fn test_crack_along_x() {
        let config = RockConfig {
            x_size: 12,
            y_size: 10,
            z_size: 8,
            crack_width: 2,
            direction: CrackDirection::X,
            ..Default::default()
        };
        let model = generate_rock(&config).unwrap();

        // Flat model: one free layer, one rock layer
        for x in 0..12 {
            assert!(model.is_free(x, 4, 1) && model.is_free(x, 5, 1));
            assert!(model.atom(x, 3, 1).is_rock());
            assert!(model.is_free(x, 3, 0) && model.is_free(x, 3, 2));
        }
    }

    #[test]
    fn test_same_seed_same_rock() {
        let config = RockConfig {
            style: RockStyle::Fractal,
            uniform: false,
            crack_width: 8,
            crack_growth_steps: 4,
            fractal_levels: 3,
            cave: true,
            seed: 77,
            ..Default::default()
        };
        let a = generate_rock(&config).unwrap();
        let b = generate_rock(&config).unwrap();
        assert_eq!(a.atoms(), b.atoms());

        let other = generate_rock(&RockConfig { seed: 78, ..config }).unwrap();
        assert_eq!(other.dims(), a.dims());
    }

    #[test]
    fn test_cave_fills_below_slab() {
        let config = RockConfig { cave: true, ..Default::default() };
        let model = generate_rock(&config).unwrap();
        assert!(model.atom(0, 0, 63).is_rock());
        assert!(model.is_free(32, 0, 37));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = RockConfig { z_size: 0, ..Default::default() };
        assert!(matches!(generate_rock(&config), Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_fill_slab_clips() {
        let mut model = VoxelModel::new(1000, 3, 3, 4).unwrap();
        fill_slab(&mut model, 2, 10);
        assert_eq!(model.count_material(Material::Rock), 18);
        fill_slab(&mut model, 4, 1);
        assert_eq!(model.count_material(Material::Rock), 18);
    }
}
