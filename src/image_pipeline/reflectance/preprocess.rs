//! Radiometric preprocessing: gamma linearization, ambient removal and
//! negative-pixel clamping.

use tracing::{debug, warn};

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::raster::RasterImage;
use crate::image_pipeline::reflectance::gradient_set::GradientIlluminationSet;

/// Display gamma of the acquisition camera's JPEG output.
pub const DEFAULT_GAMMA: f32 = 2.2;

/// Converts display-encoded values in [0, 1] to scene-linear values (`v^gamma`).
pub fn remove_gamma_correction(image: &RasterImage, gamma: f32) -> RasterImage {
    image.powf(gamma)
}

/// Inverse of [`remove_gamma_correction`] (`v^(1/gamma)`).
pub fn apply_gamma_correction(image: &RasterImage, gamma: f32) -> RasterImage {
    image.powf(1.0 / gamma)
}

/// Zeroes every pixel that has at least one negative channel.
///
/// All channels of such a pixel are cleared, not only the negative one, so the
/// discarded pixels stay neutral.
pub fn set_negative_pixels_to_zero(image: &RasterImage) -> RasterImage {
    let mut result = image.clone();
    result.map_pixels_in_place(|pixel| {
        if pixel.iter().any(|&v| v < 0.0) {
            pixel.fill(0.0);
        }
    });
    result
}

/// Subtracts the ambient capture from every image of the set, then clamps negatives.
pub fn remove_ambient_illumination(
    set: GradientIlluminationSet,
    ambient: &RasterImage,
) -> Result<GradientIlluminationSet> {
    debug!("Removing ambient illumination");
    set.try_map(|capture| Ok(set_negative_pixels_to_zero(&capture.sub(ambient)?)))
}

/// Clamps `value` into `[inf, sup]`.
///
/// An inverted range is reported and the value is returned unchanged.
pub fn clamp(value: f32, inf: f32, sup: f32) -> f32 {
    if inf > sup {
        warn!(inf, sup, "clamp called with an inverted range, value left unclamped");
        return value;
    }
    if value < inf {
        inf
    } else if value > sup {
        sup
    } else {
        value
    }
}
