//! Cracks through the rock slab
//!
//! A crack is described by a width table: for every position along the
//! crack, where the crack starts across its span and how wide it is there.
//! A uniform crack has constant width. A non-uniform one narrows towards
//! both ends in random steps, independently on each side.

use rand::Rng;

use crate::voxel::{Material, VoxelModel};
use super::config::CrackDirection;

/// Side cracks shrink faster the further they sit from the parent's center
const AWAY_FACTOR: f64 = 1.3;

/// Crack extent at one position along its length
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CrackWidth {
    /// Offset of the first carved cell across the span
    pub left: u32,
    /// Carved cells
    pub width: u32,
}

#[derive(Clone, Copy, Debug)]
struct WidthStep {
    length: u32,
    step: u32,
}

/// Random narrowing steps over `space` positions, removing up to `max_width` cells
fn growth_steps<R: Rng + ?Sized>(count: u32, space: u32, max_width: u32, rng: &mut R) -> Vec<WidthStep> {
    let space_range = if space > 1 { space / 2 } else { space };
    let width_range = if max_width > 1 { max_width / 2 } else { max_width };
    let mut space_left = space;
    let mut width_left = max_width;

    (0..count)
        .map(|_| {
            let length = if space_left > 0 { 1 + rng.gen_range(0..space_range) } else { 0 };
            let step = if width_left > 0 { 1 + rng.gen_range(0..width_range) } else { 0 };
            space_left = space_left.saturating_sub(length);
            width_left = width_left.saturating_sub(step);
            WidthStep { length, step }
        })
        .collect()
}

/// Total narrowing reached `distance` positions away from the center
fn narrowing_at(steps: &[WidthStep], distance: u32) -> u32 {
    let mut remaining = distance;
    let mut narrowing = 0;
    for s in steps {
        if remaining < s.length {
            break;
        }
        narrowing += s.step;
        remaining -= s.length;
    }
    narrowing
}

/// Width table for a crack of `length` positions across a `span` of cells
///
/// Widths at or above the span fall back to a one-cell crack.
pub fn crack_width_table<R: Rng + ?Sized>(
    length: u32,
    span: u32,
    uniform: bool,
    crack_width: u32,
    growth: u32,
    rng: &mut R,
) -> Vec<CrackWidth> {
    let width = if crack_width < span { crack_width } else { 1 };
    let half_left = width / 2;
    let half_right = width - half_left;

    if uniform || growth == 0 {
        let left = (span - width) / 2;
        return vec![CrackWidth { left, width }; length as usize];
    }

    let half = length / 2;
    let left_up = growth_steps(growth, half, half_left, rng);
    let left_down = growth_steps(growth, half, half_left, rng);
    let right_up = growth_steps(growth, half, half_right, rng);
    let right_down = growth_steps(growth, half, half_right, rng);

    (0..length)
        .map(|i| {
            let (distance, left_steps, right_steps) = if i < half {
                (half - i, &left_down, &right_down)
            } else {
                (i - half, &left_up, &right_up)
            };
            let crack_left = half_left.saturating_sub(narrowing_at(left_steps, distance));
            let crack_right = half_right.saturating_sub(narrowing_at(right_steps, distance));
            CrackWidth {
                left: span / 2 - crack_left,
                width: crack_left + crack_right,
            }
        })
        .collect()
}

/// Rectangle of the slab a crack is drawn in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CrackRegion {
    pub x0: u32,
    pub x_len: u32,
    pub y0: u32,
    pub y_len: u32,
}

impl CrackRegion {
    pub fn whole(model: &VoxelModel) -> Self {
        Self { x0: 0, x_len: model.x_size(), y0: 0, y_len: model.y_size() }
    }

    /// Positions along and across a crack running in `direction`
    fn length_and_span(&self, direction: CrackDirection) -> (u32, u32) {
        match direction {
            CrackDirection::Y => (self.y_len, self.x_len),
            CrackDirection::X => (self.x_len, self.y_len),
        }
    }
}

/// Turn slab layers `z0..z0 + thickness` into air along a width table
///
/// Cells outside the model are ignored. Returns the number of columns carved.
pub fn carve_crack(
    model: &mut VoxelModel,
    region: CrackRegion,
    direction: CrackDirection,
    table: &[CrackWidth],
    z0: u32,
    thickness: u32,
) -> usize {
    let z_end = (z0 + thickness).min(model.z_size());
    let (along0, across0, along_size, across_size) = match direction {
        CrackDirection::Y => (region.y0, region.x0, model.y_size(), model.x_size()),
        CrackDirection::X => (region.x0, region.y0, model.x_size(), model.y_size()),
    };

    let mut columns = 0;
    for (i, entry) in table.iter().enumerate() {
        let along = along0 + i as u32;
        if along >= along_size {
            break;
        }
        let start = across0 + entry.left;
        let end = (start + entry.width).min(across_size);
        for across in start..end {
            let (x, y) = match direction {
                CrackDirection::Y => (across, along),
                CrackDirection::X => (along, across),
            };
            for z in z0..z_end {
                model.set_material(x, y, z, Material::Air);
            }
            columns += 1;
        }
    }
    columns
}

/// One crack still to be drawn
#[derive(Clone, Copy, Debug)]
struct CrackJob {
    direction: CrackDirection,
    region: CrackRegion,
    crack_width: u32,
    levels: u32,
}

/// Parameters shared by every crack of a fractal
#[derive(Clone, Copy, Debug)]
pub struct FractalParams {
    pub uniform: bool,
    pub crack_width: u32,
    pub growth: u32,
    pub shrink: f64,
    pub levels: u32,
    pub cardinality: u32,
}

/// Draw a base crack and its side cracks, level by level
///
/// Each crack spawns `cardinality` perpendicular side cracks at random
/// positions where it is open, shrunk by `shrink` and more so the further
/// they are from its center.
pub fn carve_fractal_crack<R: Rng + ?Sized>(
    model: &mut VoxelModel,
    direction: CrackDirection,
    params: FractalParams,
    z0: u32,
    thickness: u32,
    rng: &mut R,
) -> usize {
    let mut jobs = vec![CrackJob {
        direction,
        region: CrackRegion::whole(model),
        crack_width: params.crack_width,
        levels: params.levels,
    }];
    let mut cracks = 0;

    while let Some(job) = jobs.pop() {
        let (length, span) = job.region.length_and_span(job.direction);
        if length == 0 || span == 0 {
            continue;
        }
        let table = crack_width_table(length, span, params.uniform, job.crack_width, params.growth, rng);
        carve_crack(model, job.region, job.direction, &table, z0, thickness);
        cracks += 1;

        let region = job.region;
        let recurse = job.crack_width > 0 && region.x_len > 1 && region.y_len > 1 && job.levels > 1;
        let center = length / 2;
        if !recurse || center == 0 || table.iter().all(|e| e.width == 0) {
            continue;
        }

        for _ in 0..params.cardinality {
            let at = loop {
                let at = rng.gen_range(0..length);
                if table[at as usize].width != 0 {
                    break at;
                }
            };
            let offset = center as i64 - at as i64;
            let redux = (center as f64 - offset.unsigned_abs() as f64 / AWAY_FACTOR) / center as f64;
            let scale = params.shrink * redux;
            let x_len = (region.x_len as f64 * scale) as u32;
            let y_len = (region.y_len as f64 * scale) as u32;
            let x_margin = (region.x_len.saturating_sub(x_len) / 2) as i64;
            let y_margin = (region.y_len.saturating_sub(y_len) / 2) as i64;

            // The side crack is shifted along the parent to where it branches off
            let (x0, y0) = match job.direction {
                CrackDirection::Y => (region.x0 as i64 + x_margin, region.y0 as i64 + y_margin + offset),
                CrackDirection::X => (region.x0 as i64 + x_margin + offset, region.y0 as i64 + y_margin),
            };
            if x0 < 0 || y0 < 0 {
                log::trace!("Side crack at {} falls outside the model", at);
                continue;
            }

            jobs.push(CrackJob {
                direction: job.direction.perpendicular(),
                region: CrackRegion { x0: x0 as u32, x_len, y0: y0 as u32, y_len },
                crack_width: (job.crack_width as f64 * scale) as u32,
                levels: job.levels - 1,
            });
        }
    }

    log::debug!("Carved {} fractal cracks", cracks);
    cracks
}
