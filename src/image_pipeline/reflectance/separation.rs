use tracing::info;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::mask::Mask;
use crate::image_pipeline::common::raster::RasterImage;
use crate::image_pipeline::reflectance::calibration::scale_to_unit_range;
use crate::image_pipeline::reflectance::preprocess::set_negative_pixels_to_zero;

/// Diffuse and specular albedo of the sample.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbedoMaps {
    /// Present only when cross-polarized data was captured
    pub diffuse: Option<RasterImage>,
    pub specular: RasterImage,
}

/// Separates albedo from the flat-lit captures.
///
/// The cross-polarized capture only sees diffuse reflection, so the specular
/// albedo is what the parallel capture adds on top of it. Without cross data the
/// parallel capture is reported as specular and no diffuse map exists.
pub fn separate_diffuse_specular(
    parallel_flat: &RasterImage,
    cross_flat: Option<&RasterImage>,
    mask: &Mask,
) -> Result<AlbedoMaps> {
    match cross_flat {
        Some(cross_flat) => {
            info!("Separating diffuse and specular albedo");
            let specular = set_negative_pixels_to_zero(&parallel_flat.sub(cross_flat)?);
            Ok(AlbedoMaps {
                diffuse: Some(scale_to_unit_range(cross_flat, mask)?),
                specular: scale_to_unit_range(&specular, mask)?,
            })
        }
        None => {
            info!("No cross-polarized data, specular albedo taken from parallel capture");
            Ok(AlbedoMaps {
                diffuse: None,
                specular: scale_to_unit_range(parallel_flat, mask)?,
            })
        }
    }
}
