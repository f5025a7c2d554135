//! Rotating square beam geometry.
//!
//! The target is a vertical line at fixed (x, z). The beam starts on the
//! proximity circle around the observer, on the side facing the target, and
//! climbs as a stack of square cross-sections, each rotated by the current
//! angle around its own center.

use crate::config::BeamConfig;
use crate::constants::{GRID_STEP_EPSILON, MAX_BEAM_MARKERS};
use glam::{DVec2, DVec3};
use smallvec::SmallVec;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GeometryError {
    #[error("observer at ({x}, {z}) stands on the target line; beam direction is undefined")]
    Degenerate { x: f64, z: f64 },
    #[error("beam would need more than {limit} markers")]
    TooLarge { limit: usize },
}

/// Offsets of one cross-section, before rotation. Small beams fit inline.
pub type GridOffsets = SmallVec<[DVec2; 16]>;

/// Unit vector from the observer toward the target line, with no vertical component.
pub fn direction_to_target(target: DVec2, observer: DVec3) -> Result<DVec3, GeometryError> {
    let toward = DVec3::new(target.x, observer.y, target.y) - observer;
    toward.try_normalize().ok_or(GeometryError::Degenerate {
        x: observer.x,
        z: observer.z,
    })
}

/// Point where the beam starts: `distance` away from the observer, facing the target.
pub fn beam_origin(target: DVec2, observer: DVec3, distance: f64) -> Result<DVec3, GeometryError> {
    Ok(observer + direction_to_target(target, observer)? * distance)
}

/// Number of whole steps of `spacing` that fit in `size`.
///
/// Counting by index keeps the far edge stable: a size that is an exact
/// multiple of the spacing always includes both edges.
#[inline]
pub fn grid_steps(size: f64, spacing: f64) -> usize {
    if !(spacing > 0.0) || !(size >= 0.0) {
        return 0;
    }
    (size / spacing + GRID_STEP_EPSILON).floor() as usize
}

/// Points in one cross-section, or `None` when the count does not fit in `usize`.
pub fn section_len(size: f64, spacing: f64) -> Option<usize> {
    let side = grid_steps(size, spacing).checked_add(1)?;
    side.checked_mul(side)
}

/// Markers in a whole beam of `layers` cross-sections, or `None` on overflow.
pub fn beam_marker_count(size: f64, spacing: f64, layers: u32) -> Option<usize> {
    section_len(size, spacing)?.checked_mul(layers as usize)
}

fn too_large() -> GeometryError {
    GeometryError::TooLarge {
        limit: MAX_BEAM_MARKERS,
    }
}

/// Square grid covering `[-size/2, size/2]` on both axes, ordered by x then z.
///
/// Fails when the grid would hold more than [`MAX_BEAM_MARKERS`] points.
pub fn grid_offsets(size: f64, spacing: f64) -> Result<GridOffsets, GeometryError> {
    let len = section_len(size, spacing)
        .filter(|&len| len <= MAX_BEAM_MARKERS)
        .ok_or_else(too_large)?;
    let half = size / 2.0;
    let steps = grid_steps(size, spacing);
    let mut offsets = GridOffsets::with_capacity(len);
    for i in 0..=steps {
        let x = -half + i as f64 * spacing;
        for j in 0..=steps {
            let z = -half + j as f64 * spacing;
            offsets.push(DVec2::new(x, z));
        }
    }
    Ok(offsets)
}

/// Rotate a horizontal offset by `angle` radians (x is world X, y is world Z).
#[inline]
pub fn rotate_xz(offset: DVec2, angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    DVec2::new(
        offset.x * cos - offset.y * sin,
        offset.x * sin + offset.y * cos,
    )
}

/// Append every marker position of the beam to `out`, returning how many were added.
///
/// Order: layer ascending, then grid x ascending, then grid z ascending.
/// A beam above [`MAX_BEAM_MARKERS`] fails with [`GeometryError::TooLarge`]
/// and leaves `out` untouched.
pub fn generate_beam_into(
    target: DVec2,
    observer: DVec3,
    angle: f64,
    config: &BeamConfig,
    out: &mut Vec<DVec3>,
) -> Result<usize, GeometryError> {
    let origin = beam_origin(target, observer, config.center_distance)?;
    let total = beam_marker_count(
        config.beam_size,
        config.particle_spacing,
        config.particle_count,
    )
    .filter(|&total| total <= MAX_BEAM_MARKERS)
    .ok_or_else(too_large)?;
    let section: GridOffsets = grid_offsets(config.beam_size, config.particle_spacing)?
        .into_iter()
        .map(|offset| rotate_xz(offset, angle))
        .collect();

    let start = out.len();
    out.reserve(total);
    for layer in 0..config.particle_count {
        let y = origin.y + f64::from(layer) * config.particle_spacing;
        for offset in &section {
            out.push(DVec3::new(origin.x + offset.x, y, origin.z + offset.y));
        }
    }
    Ok(out.len() - start)
}

/// All marker positions of the beam for one observer.
pub fn generate_beam(
    target: DVec2,
    observer: DVec3,
    angle: f64,
    config: &BeamConfig,
) -> Result<Vec<DVec3>, GeometryError> {
    let mut points = Vec::new();
    generate_beam_into(target, observer, angle, config, &mut points)?;
    Ok(points)
}
