use image::DynamicImage;
use tracing::debug;

use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::common::raster::{ChannelLayout, RasterImage};
use crate::image_pipeline::photo::reader::PhotoReader;
use crate::image_pipeline::photo::types::{Photo, Transfer};

/// Reader for JPEG, PNG, BMP and TIFF photographs, backed by the image crate.
///
/// Integer samples are normalized by their type's maximum (255 or 65535) and
/// reported as display encoded; float samples are taken as linear.
pub struct EncodedPhotoReader;

impl PhotoReader for EncodedPhotoReader {
    fn read_photo(&self, data: &[u8]) -> Result<Photo> {
        debug!("Decoding photograph, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| ReflectanceError::DecodeError(e.to_string()))?;

        let transfer = match decoded {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => Transfer::Linear,
            _ => Transfer::DisplayEncoded,
        };

        let rgb = decoded.to_rgb32f();
        let (width, height) = rgb.dimensions();
        debug!("Decoded photograph: {}x{} ({:?})", width, height, transfer);

        let image = RasterImage::new(width as usize, height as usize, ChannelLayout::Rgb, rgb.into_raw())?;
        Ok(Photo { image, transfer })
    }
}
