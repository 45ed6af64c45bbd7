//! Rotates a normal map so the sample's average normal points along +Z.

use glam::{DVec3, Mat3, Vec3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::common::mask::Mask;
use crate::image_pipeline::reflectance::normals::NormalMap;

/// Axis the average sample normal is aligned with.
pub const CANONICAL_AXIS: Vec3 = Vec3::Z;

/// Below this `sin θ` the average normal is treated as parallel to the canonical axis.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Sum of the valid masked normals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalSum {
    pub sum: DVec3,
    pub count: usize,
    /// Masked pixels rejected for holding a NaN component
    pub skipped: usize,
}

impl NormalSum {
    pub fn merge(self, other: NormalSum) -> NormalSum {
        NormalSum {
            sum: self.sum + other.sum,
            count: self.count + other.count,
            skipped: self.skipped + other.skipped,
        }
    }

    /// Unit average normal, or `None` when no pixel was accounted.
    pub fn average(&self) -> Option<Vec3> {
        if self.count == 0 {
            return None;
        }
        let mean = (self.sum / self.count as f64).as_vec3();
        Some(mean / mean.length())
    }
}

/// Sums the normals inside the mask, skipping any with a NaN component.
///
/// Rows are reduced in parallel and merged in row order, so the result does not
/// depend on scheduling.
pub fn masked_normal_sum(normals: &NormalMap, mask: &Mask) -> Result<NormalSum> {
    if normals.dimensions() != mask.dimensions() {
        return Err(ReflectanceError::DimensionMismatch {
            expected: mask.dimensions(),
            found: normals.dimensions(),
        });
    }

    let width = normals.width();
    if width == 0 || normals.height() == 0 {
        return Err(ReflectanceError::InvalidDimensions(width, normals.height()));
    }
    let rows: Vec<NormalSum> = normals
        .normals()
        .par_chunks(width)
        .zip(mask.flags().par_chunks(width))
        .enumerate()
        .map(|(y, (row, inside))| {
            let mut partial = NormalSum::default();
            for (x, (normal, _)) in row.iter().zip(inside).enumerate().filter(|(_, (_, m))| **m) {
                if normal.is_nan() {
                    debug!(x, y, "NaN normal skipped");
                    partial.skipped += 1;
                } else {
                    partial.sum += normal.as_dvec3();
                    partial.count += 1;
                }
            }
            partial
        })
        .collect();

    Ok(rows.into_iter().fold(NormalSum::default(), NormalSum::merge))
}

/// Skew-symmetric matrix `[v]×` such that `[v]× w = v × w`.
pub fn cross_product_matrix(v: Vec3) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(0.0, v.z, -v.y),
        Vec3::new(-v.z, 0.0, v.x),
        Vec3::new(v.y, -v.x, 0.0),
    )
}

/// Rodrigues rotation `I + sinθ [k]× + (1 - cosθ) [k]×²` about the unit axis `k`.
pub fn rodrigues_rotation(unit_axis: Vec3, sin: f32, cos: f32) -> Mat3 {
    let k = cross_product_matrix(unit_axis);
    Mat3::IDENTITY + k * sin + (k * k) * (1.0 - cos)
}

/// Rotation taking `normal` (unit length) onto [`CANONICAL_AXIS`].
///
/// When the two are parallel the rotation is the identity; when they are
/// opposite it is a half turn about the x axis.
pub fn rotation_to_canonical(normal: Vec3) -> Mat3 {
    let axis = normal.cross(CANONICAL_AXIS);
    let cos = normal.dot(CANONICAL_AXIS);
    let sin = axis.length();

    if sin < PARALLEL_EPSILON {
        if cos >= 0.0 {
            return Mat3::IDENTITY;
        }
        warn!("Average normal points away from the camera, flipping about the x axis");
        return Mat3::from_diagonal(Vec3::new(1.0, -1.0, -1.0));
    }

    rodrigues_rotation(axis / sin, sin, cos)
}

/// Applies one rotation to every normal of the map, masked or not.
pub fn apply_rotation(normals: &NormalMap, rotation: &Mat3) -> NormalMap {
    let mut rotated = normals.clone();
    rotated
        .normals_mut()
        .par_iter_mut()
        .for_each(|n| *n = *rotation * *n);
    rotated
}

/// Result of aligning a normal map.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedNormals {
    pub normals: NormalMap,
    /// Average masked normal before rotation, if any pixel was accounted
    pub average: Option<Vec3>,
    pub rotation: Mat3,
}

/// Rotates the whole map so the average normal inside `mask` becomes +Z.
///
/// An empty mask leaves the normals unrotated.
pub fn align_average_normal(normals: &NormalMap, mask: &Mask) -> Result<AlignedNormals> {
    let sum = masked_normal_sum(normals, mask)?;
    if sum.skipped > 0 {
        warn!(skipped = sum.skipped, "NaN normals excluded from the average");
    }

    let Some(average) = sum.average() else {
        warn!("Mask selects no valid normal, skipping alignment");
        return Ok(AlignedNormals {
            normals: normals.clone(),
            average: None,
            rotation: Mat3::IDENTITY,
        });
    };
    info!(
        x = average.x,
        y = average.y,
        z = average.z,
        pixels = sum.count,
        "Average surface normal"
    );

    let rotation = rotation_to_canonical(average);
    Ok(AlignedNormals {
        normals: apply_rotation(normals, &rotation),
        average: Some(average),
        rotation,
    })
}
