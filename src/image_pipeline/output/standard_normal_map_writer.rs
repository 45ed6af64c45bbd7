use std::io::{Cursor, Write};

use tracing::debug;

use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::output::types::{NormalMapFormat, OutputConfig, TiffCompression};
use crate::image_pipeline::output::writer::NormalMapWriter;
use crate::image_pipeline::reflectance::NormalMap;

/// Writes the normal map as 8-bit RGB TIFF or BMP, per [`OutputConfig`].
pub struct StandardNormalMapWriter;

impl StandardNormalMapWriter {
    fn encode_tiff(&self, normals: &NormalMap, pixels: &[u8], config: &OutputConfig) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();

        let compression = match config.tiff_compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Best),
        };

        let mut encoder = tiff::encoder::TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| ReflectanceError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if let Some(predictor_val) = config.tiff_predictor {
            let predictor = match predictor_val {
                2 => tiff::tags::Predictor::Horizontal,
                _ => tiff::tags::Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        encoder
            .write_image::<tiff::encoder::colortype::RGB8>(
                normals.width() as u32,
                normals.height() as u32,
                pixels,
            )
            .map_err(|e| ReflectanceError::EncodeError(e.to_string()))?;

        Ok(buffer)
    }

    fn encode_bmp(&self, normals: &NormalMap, pixels: Vec<u8>) -> Result<Vec<u8>> {
        let image = image::RgbImage::from_raw(normals.width() as u32, normals.height() as u32, pixels)
            .ok_or_else(|| ReflectanceError::EncodeError("normal map buffer has the wrong size".into()))?;

        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Bmp)
            .map_err(|e| ReflectanceError::EncodeError(e.to_string()))?;
        Ok(buffer)
    }
}

impl NormalMapWriter for StandardNormalMapWriter {
    fn write_normal_map(&self, normals: &NormalMap, output: &mut dyn Write, config: &OutputConfig) -> Result<()> {
        debug!(
            format = ?config.normal_map_format,
            "Encoding normal map: {}x{}",
            normals.width(),
            normals.height()
        );

        let pixels = normals.encode_rgb8();
        let buffer = match config.normal_map_format {
            NormalMapFormat::Tiff => self.encode_tiff(normals, &pixels, config)?,
            NormalMapFormat::Bmp => self.encode_bmp(normals, pixels)?,
        };

        output.write_all(&buffer)?;

        debug!("Normal map encoding complete");
        Ok(())
    }
}
