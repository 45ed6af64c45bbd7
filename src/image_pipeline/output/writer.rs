use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::raster::RasterImage;
use crate::image_pipeline::output::types::OutputConfig;
use crate::image_pipeline::reflectance::NormalMap;

/// Encodes high-dynamic-range result maps (albedo, roughness).
pub trait FloatImageWriter {
    fn write_float_image(&self, image: &RasterImage, output: &mut dyn Write) -> Result<()>;
    fn extension(&self) -> &'static str;
}

/// Encodes the colour-coded 8-bit normal map.
pub trait NormalMapWriter {
    fn write_normal_map(&self, normals: &NormalMap, output: &mut dyn Write, config: &OutputConfig) -> Result<()>;
}
