//! Packed atom (cell) type

use bytemuck::{CheckedBitPattern, NoUninit, Zeroable};
use serde::{Deserialize, Serialize};

/// 2-bit channel value back to 8-bit
const SHORT_TO_LONG: [u8; 4] = [0x00, 0x50, 0xB0, 0xFF];

const MATERIAL_MASK: u8 = 0x03;
const COLOR_MASK: u8 = 0xFC;

/// Quantize an 8-bit color channel to 2 bits
pub fn channel_to_short(value: u8) -> u8 {
    value >> 6
}

/// Expand a 2-bit color channel to 8 bits
pub fn channel_to_long(value: u8) -> u8 {
    SHORT_TO_LONG[(value & 0x03) as usize]
}

/// Cell material
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Material {
    #[default]
    Air = 0,
    Rock = 1,
    Water = 2,
}

impl Material {
    /// Decode the low two bits of a cell byte
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & MATERIAL_MASK {
            0 => Some(Material::Air),
            1 => Some(Material::Rock),
            2 => Some(Material::Water),
            _ => None,
        }
    }
}

/// Full 8-bit-per-channel color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const RED: Rgb = Rgb::new(0xFF, 0x00, 0x00);
    pub const GREEN: Rgb = Rgb::new(0x00, 0xFF, 0x00);
    pub const BLUE: Rgb = Rgb::new(0x00, 0x00, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The color as it survives a trip through the packed cell format
    pub fn quantized(self) -> Self {
        Self {
            r: channel_to_long(channel_to_short(self.r)),
            g: channel_to_long(channel_to_short(self.g)),
            b: channel_to_long(channel_to_short(self.b)),
        }
    }
}

/// Single cell - exactly 1 byte
///
/// Bits 0-1 hold the material, bits 2-7 the color as 2 bits per channel
/// (blue lowest, red highest). Material bits `0b11` are never produced, so
/// an atom can be viewed as a byte but a byte is only an atom after checking.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, NoUninit, Zeroable)]
pub struct Atom(u8);

// SAFETY: Atom is a transparent u8; the check only narrows the accepted bytes
unsafe impl CheckedBitPattern for Atom {
    type Bits = u8;

    fn is_valid_bit_pattern(bits: &u8) -> bool {
        Material::from_bits(*bits).is_some()
    }
}

impl Atom {
    /// Black air
    pub const AIR: Atom = Atom(0x00);

    /// Create atom from material and full color
    pub fn new(material: Material, color: Rgb) -> Self {
        let mut atom = Atom(material as u8);
        atom.set_color(color);
        atom
    }

    /// Decode a raw cell byte, rejecting an invalid material
    pub fn from_bits(bits: u8) -> Option<Self> {
        Material::from_bits(bits).map(|_| Atom(bits))
    }

    /// Wrap a byte already checked with [`Atom::from_bits`]
    pub(crate) fn from_valid_bits(bits: u8) -> Self {
        debug_assert!(Material::from_bits(bits).is_some(), "invalid atom byte {bits:#04x}");
        Atom(bits)
    }

    /// Raw packed byte
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn material(self) -> Material {
        match self.0 & MATERIAL_MASK {
            0 => Material::Air,
            1 => Material::Rock,
            2 => Material::Water,
            bits => unreachable!("atom holds invalid material bits {bits}"),
        }
    }

    /// Change the material, keeping the color
    pub fn set_material(&mut self, material: Material) {
        self.0 = (self.0 & COLOR_MASK) | material as u8;
    }

    /// Get the color expanded to 8 bits per channel
    pub fn color(self) -> Rgb {
        let packed = self.0 >> 2;
        Rgb {
            r: channel_to_long(packed >> 4),
            g: channel_to_long(packed >> 2),
            b: channel_to_long(packed),
        }
    }

    /// Change the color, keeping the material
    pub fn set_color(&mut self, color: Rgb) {
        self.0 = (self.0 & MATERIAL_MASK)
            | (channel_to_short(color.r) << 6)
            | (channel_to_short(color.g) << 4)
            | (channel_to_short(color.b) << 2);
    }

    /// Check if the cell is air
    pub fn is_free(self) -> bool {
        self.material() == Material::Air
    }

    pub fn is_rock(self) -> bool {
        self.material() == Material::Rock
    }

    pub fn is_water(self) -> bool {
        self.material() == Material::Water
    }
}
