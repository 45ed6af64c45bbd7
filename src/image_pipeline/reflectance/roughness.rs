//! Roughness from first- and second-order gradient moments.
//!
//! Dividing a gradient capture by the flat capture gives a moment of the
//! reflectance lobe: first-order gradients give its mean direction, the
//! curvature captures its second moment. Their difference is the lobe's
//! variance per axis.

use rayon::prelude::*;
use tracing::info;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::raster::{Channel, ChannelLayout, RasterImage};
use crate::image_pipeline::reflectance::gradient_set::{GradientSource, SpecularGradients};

/// Per-axis variance of the reflectance lobe, `L2/L0 - (L1/L0)²`, for every channel.
#[derive(Debug, Clone, PartialEq)]
pub struct LobeVariance {
    pub x: RasterImage,
    pub y: RasterImage,
}

pub fn lobe_variance(
    gradients: &SpecularGradients,
    curvature_x: &RasterImage,
    curvature_y: &RasterImage,
) -> Result<LobeVariance> {
    let horizontal = gradients.minus_x.sub(&gradients.plus_x)?;
    let vertical = gradients.plus_y.sub(&gradients.minus_y)?;

    let first_x = horizontal.div(&gradients.flat)?;
    let first_y = vertical.div(&gradients.flat)?;

    let second_x = curvature_x.div(&gradients.flat)?;
    let second_y = curvature_y.div(&gradients.flat)?;

    Ok(LobeVariance {
        x: second_x.sub(&first_x.mul(&first_x)?)?,
        y: second_y.sub(&first_y.mul(&first_y)?)?,
    })
}

/// Combines the per-axis variances of one pixel into a roughness value.
///
/// Specular-only gradients use `sqrt(vx² + vy²) / 4`. Parallel-only gradients
/// take one more square root, `sqrt(sqrt(vx² + vy²)) / 4`. The two are not
/// equivalent; both follow the calibrated acquisitions they were derived on.
pub fn roughness_from_variance(variance_x: f32, variance_y: f32, source: GradientSource) -> f32 {
    let magnitude = (variance_x * variance_x + variance_y * variance_y).sqrt();
    match source {
        GradientSource::ParallelMinusCross => magnitude / 4.0,
        GradientSource::ParallelOnly => magnitude.sqrt() / 4.0,
    }
}

/// Estimates roughness on the green channel and broadcasts it to three channels.
///
/// No mask is applied; pixels with a zero flat capture come out as NaN or inf.
pub fn estimate_roughness(
    gradients: &SpecularGradients,
    curvature_x: &RasterImage,
    curvature_y: &RasterImage,
) -> Result<RasterImage> {
    info!(source = ?gradients.source, "Estimating roughness");
    let variance = lobe_variance(gradients, curvature_x, curvature_y)?;

    let variance_x = variance.x.channel(Channel::Green).into_raw();
    let variance_y = variance.y.channel(Channel::Green).into_raw();
    let source = gradients.source;

    let data = variance_x
        .par_iter()
        .zip(variance_y.par_iter())
        .flat_map_iter(|(&vx, &vy)| {
            let roughness = roughness_from_variance(vx, vy, source);
            [roughness; 3]
        })
        .collect();

    let (width, height) = gradients.dimensions();
    RasterImage::new(width, height, ChannelLayout::Rgb, data)
}
