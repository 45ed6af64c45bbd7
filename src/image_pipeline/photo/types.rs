//! Photograph types

use crate::image_pipeline::common::raster::RasterImage;
use crate::image_pipeline::reflectance::remove_gamma_correction;

/// Transfer characteristic of decoded pixel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Gamma-encoded output of a camera's JPEG/PNG/TIFF pipeline
    DisplayEncoded,
    /// Proportional to scene radiance (RAW sensor data, float formats)
    Linear,
}

/// A decoded photograph, normalized to [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub image: RasterImage,
    pub transfer: Transfer,
}

impl Photo {
    /// Scene-linear pixels; display-encoded photos have their gamma removed.
    pub fn linearize(self, gamma: f32) -> RasterImage {
        match self.transfer {
            Transfer::DisplayEncoded => remove_gamma_correction(&self.image, gamma),
            Transfer::Linear => self.image,
        }
    }
}
