//! Model file format
//!
//! A fixed 20-byte little-endian header (magic, unit, x, y, z sizes) followed
//! by the raw one-byte cells in z-major order.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::core::{Error, Result};
use super::atom::Atom;
use super::model::{cell_count, VoxelModel};

/// Magic number at the start of every model file
pub const MODEL_MAGIC: u32 = 0xCA5E_F058;

/// On-disk header
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
struct ModelHeader {
    magic: u32,
    unit: u32,
    x_size: u32,
    y_size: u32,
    z_size: u32,
}

/// Size of the header in bytes
pub const HEADER_LEN: usize = std::mem::size_of::<ModelHeader>();

impl ModelHeader {
    fn for_model(model: &VoxelModel) -> Self {
        Self {
            magic: MODEL_MAGIC.to_le(),
            unit: model.unit().to_le(),
            x_size: model.x_size().to_le(),
            y_size: model.y_size().to_le(),
            z_size: model.z_size().to_le(),
        }
    }

    fn from_le_bytes(bytes: &[u8]) -> Self {
        let raw: ModelHeader = bytemuck::pod_read_unaligned(&bytes[..HEADER_LEN]);
        Self {
            magic: u32::from_le(raw.magic),
            unit: u32::from_le(raw.unit),
            x_size: u32::from_le(raw.x_size),
            y_size: u32::from_le(raw.y_size),
            z_size: u32::from_le(raw.z_size),
        }
    }
}

/// Serialize a model to bytes
pub fn encode_model(model: &VoxelModel) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + model.len());
    bytes.extend_from_slice(bytemuck::bytes_of(&ModelHeader::for_model(model)));
    bytes.extend_from_slice(bytemuck::cast_slice(model.atoms()));
    bytes
}

/// Parse and validate a model from the bytes of a model file
///
/// The cells are validated in place and the buffer becomes the model's
/// storage, so a file is never held twice in memory.
pub fn decode_model(mut data: Vec<u8>) -> Result<VoxelModel> {
    if data.len() < HEADER_LEN {
        return Err(Error::Truncated { len: data.len(), header: HEADER_LEN });
    }

    let header = ModelHeader::from_le_bytes(&data);
    if header.magic != MODEL_MAGIC {
        return Err(Error::BadMagic { found: header.magic, expected: MODEL_MAGIC });
    }

    let invalid = || Error::InvalidDimensions {
        unit: header.unit,
        x: header.x_size,
        y: header.y_size,
        z: header.z_size,
    };
    if header.unit == 0 || header.x_size == 0 || header.y_size == 0 || header.z_size == 0 {
        return Err(invalid());
    }
    let count = cell_count(header.x_size, header.y_size, header.z_size).ok_or_else(invalid)?;
    let expected = count.checked_add(HEADER_LEN).ok_or_else(invalid)?;
    if data.len() != expected {
        return Err(Error::SizeMismatch { expected, actual: data.len() });
    }

    if let Some(offset) = data[HEADER_LEN..].iter().position(|&bits| Atom::from_bits(bits).is_none()) {
        return Err(Error::InvalidAtom { offset, bits: data[HEADER_LEN + offset] });
    }

    data.drain(..HEADER_LEN);
    // Collects in place: u8 and Atom share size and alignment
    let atoms: Vec<Atom> = data.into_iter().map(Atom::from_valid_bits).collect();

    Ok(VoxelModel::from_parts(header.unit, header.x_size, header.y_size, header.z_size, atoms))
}

/// Write a model to any writer
pub fn write_model_to(model: &VoxelModel, writer: &mut impl Write) -> Result<()> {
    writer.write_all(bytemuck::bytes_of(&ModelHeader::for_model(model)))?;
    writer.write_all(bytemuck::cast_slice(model.atoms()))?;
    Ok(())
}

/// Write a model file
pub fn write_model(model: &VoxelModel, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    write_model_to(model, &mut writer)?;
    writer.flush()?;

    log::info!(
        "Wrote {}x{}x{} model to {} ({} bytes)",
        model.x_size(), model.y_size(), model.z_size(),
        path.display(),
        HEADER_LEN + model.len()
    );
    Ok(())
}

/// Read and validate a model file
pub fn read_model(path: impl AsRef<Path>) -> Result<VoxelModel> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let model = decode_model(data)?;
    log::info!(
        "Read {}x{}x{} model from {}",
        model.x_size(), model.y_size(), model.z_size(),
        path.display()
    );
    Ok(model)
}
