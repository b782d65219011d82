//! Rock generation configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Largest number of random width steps per crack side and half
pub const MAX_CRACK_GROWTH_STEPS: u32 = 500;

/// Wall thickness around the cave tunnel, in cells
pub const CAVE_WALL_THICKNESS: u32 = 10;

/// How the crack through the rock slab is drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RockStyle {
    /// One straight crack across the model
    Simple,
    /// A base crack with recursively smaller side cracks
    Fractal,
}

/// Axis the main crack runs along
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrackDirection {
    Y,
    X,
}

impl CrackDirection {
    pub fn perpendicular(self) -> Self {
        match self {
            CrackDirection::Y => CrackDirection::X,
            CrackDirection::X => CrackDirection::Y,
        }
    }
}

/// Parameters for a generated rock model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RockConfig {
    pub style: RockStyle,
    /// Constant crack width; otherwise the width narrows in random steps
    pub uniform: bool,
    /// Crack width at its widest, in cells
    pub crack_width: u32,
    /// Random narrowing steps per side and half of a non-uniform crack
    pub crack_growth_steps: u32,
    /// Size factor of each side crack relative to its parent
    pub fractal_shrink: f64,
    /// Levels of side cracks, counting the base crack
    pub fractal_levels: u32,
    /// Side cracks per crack
    pub fractal_cardinality: u32,
    pub direction: CrackDirection,
    /// Carve a cave tunnel below the slab
    pub cave: bool,
    /// Units per meter
    pub unit: u32,
    pub x_size: u32,
    pub y_size: u32,
    pub z_size: u32,
    /// PRNG seed for the crack shape
    pub seed: u64,
    /// Air layers above the slab; derived from `z_size` when unset
    pub free_space_above_rock: Option<u32>,
    /// Slab thickness; derived from `z_size` when unset
    pub rock_thickness: Option<u32>,
}

impl Default for RockConfig {
    fn default() -> Self {
        Self {
            style: RockStyle::Simple,
            uniform: true,
            crack_width: 4,
            crack_growth_steps: 5,
            fractal_shrink: 0.5,
            fractal_levels: 2,
            fractal_cardinality: 3,
            direction: CrackDirection::Y,
            cave: false,
            unit: 1000,
            x_size: 64,
            y_size: 64,
            z_size: 64,
            seed: 1,
            free_space_above_rock: None,
            rock_thickness: None,
        }
    }
}

impl RockConfig {
    fn layer_default(&self) -> u32 {
        if self.z_size > 30 { 10 } else { 1 }
    }

    /// First z of the slab
    pub fn free_space(&self) -> u32 {
        self.free_space_above_rock.unwrap_or_else(|| self.layer_default())
    }

    /// Slab thickness in cells
    pub fn thickness(&self) -> u32 {
        self.rock_thickness.unwrap_or_else(|| self.layer_default())
    }

    /// First z below the slab
    pub fn slab_end(&self) -> u32 {
        self.free_space() + self.thickness()
    }

    pub fn validate(&self) -> Result<()> {
        if self.unit == 0 || self.x_size == 0 || self.y_size == 0 || self.z_size == 0 {
            return Err(Error::InvalidDimensions {
                unit: self.unit,
                x: self.x_size,
                y: self.y_size,
                z: self.z_size,
            });
        }
        if self.slab_end() > self.z_size {
            return Err(Error::Config(format!(
                "slab z {}..{} does not fit in z size {}",
                self.free_space(), self.slab_end(), self.z_size
            )));
        }
        if !self.uniform && self.crack_growth_steps > MAX_CRACK_GROWTH_STEPS {
            return Err(Error::Config(format!(
                "crack_growth_steps {} exceeds {}",
                self.crack_growth_steps, MAX_CRACK_GROWTH_STEPS
            )));
        }
        if !(self.fractal_shrink > 0.0 && self.fractal_shrink <= 1.0) {
            return Err(Error::Config(format!("fractal_shrink {} is outside (0, 1]", self.fractal_shrink)));
        }
        if self.cave {
            if self.z_size < self.slab_end() + CAVE_WALL_THICKNESS {
                return Err(Error::Config(format!(
                    "no room for a cave: need {} layers below the slab, have {}",
                    CAVE_WALL_THICKNESS,
                    self.z_size - self.slab_end()
                )));
            }
            if self.x_size <= 2 * CAVE_WALL_THICKNESS {
                return Err(Error::Config(format!(
                    "no room for a cave: x size {} must exceed {}",
                    self.x_size,
                    2 * CAVE_WALL_THICKNESS
                )));
            }
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_defaults_follow_height() {
        let tall = RockConfig { z_size: 64, ..Default::default() };
        assert_eq!((tall.free_space(), tall.thickness()), (10, 10));

        let flat = RockConfig { z_size: 8, ..Default::default() };
        assert_eq!((flat.free_space(), flat.thickness()), (1, 1));

        let explicit = RockConfig { free_space_above_rock: Some(3), rock_thickness: Some(4), ..Default::default() };
        assert_eq!(explicit.slab_end(), 7);
    }

    #[test]
    fn test_validate() {
        assert!(RockConfig::default().validate().is_ok());
        assert!(matches!(
            RockConfig { x_size: 0, ..Default::default() }.validate(),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            RockConfig { uniform: false, crack_growth_steps: 501, ..Default::default() }.validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RockConfig { rock_thickness: Some(60), ..Default::default() }.validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RockConfig {
                cave: true,
                z_size: 25,
                free_space_above_rock: Some(10),
                rock_thickness: Some(10),
                ..Default::default()
            }
            .validate(),
            Err(Error::Config(_))
        ));
        assert!(RockConfig { cave: true, ..Default::default() }.validate().is_ok());
    }

    #[test]
    fn test_json_names() {
        let config: RockConfig =
            serde_json::from_str(r#"{ "style": "fractal", "direction": "x", "cave": true }"#).unwrap();
        assert_eq!(config.style, RockStyle::Fractal);
        assert_eq!(config.direction, CrackDirection::X);
        assert!(config.cave);
        assert_eq!(config.x_size, 64);
    }
}
