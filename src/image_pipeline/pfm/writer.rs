use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::common::raster::{ChannelLayout, RasterImage};
use crate::image_pipeline::output::FloatImageWriter;

/// Encodes `image` as little-endian PFM.
pub fn write_pfm(image: &RasterImage, output: &mut dyn Write) -> Result<()> {
    debug!(width = image.width(), height = image.height(), "Encoding PFM");

    let kind = match image.layout() {
        ChannelLayout::Rgb => "PF",
        ChannelLayout::Gray => "Pf",
    };
    let header = format!("{}\n{} {}\n-1.000000\n", kind, image.width(), image.height());

    let row_len = image.width() * image.channels();
    let mut buffer = Vec::with_capacity(header.len() + image.data().len() * 4);
    buffer.extend_from_slice(header.as_bytes());
    for row in image.data().chunks_exact(row_len).rev() {
        for &sample in row {
            buffer.write_f32::<LittleEndian>(sample)?;
        }
    }

    output.write_all(&buffer)?;
    Ok(())
}

pub fn write_pfm_file<P: AsRef<Path>>(image: &RasterImage, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path)
        .map_err(|e| ReflectanceError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
    write_pfm(image, &mut file)
}

/// Writes albedo and roughness maps as PFM.
pub struct PfmWriter;

impl FloatImageWriter for PfmWriter {
    fn write_float_image(&self, image: &RasterImage, output: &mut dyn Write) -> Result<()> {
        write_pfm(image, output)
    }

    fn extension(&self) -> &'static str {
        "pfm"
    }
}
