//! Demosaicing of Bayer-pattern sensor data into linear RGB

use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::debug;

use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::common::raster::{ChannelLayout, RasterImage};

/// Single-channel sensor data as read from a RAW file
#[derive(Debug, Clone)]
pub struct SensorData {
    pub width: usize,
    pub height: usize,
    /// One sample per photosite, in the pattern given by `cfa`
    pub data: Vec<u16>,
    pub cfa: CFA,
    pub black_level: f32,
    pub white_level: f32,
}

/// Maps a colour filter array name such as `"RGGB"` onto the bayer crate's patterns.
pub fn cfa_from_name(name: &str) -> Option<CFA> {
    match name {
        "RGGB" => Some(CFA::RGGB),
        "BGGR" => Some(CFA::BGGR),
        "GRBG" => Some(CFA::GRBG),
        "GBRG" => Some(CFA::GBRG),
        _ => None,
    }
}

/// Demosaics with linear interpolation, removes the black level and normalizes
/// by the sensor's white level.
pub fn demosaic(sensor: &SensorData) -> Result<RasterImage> {
    let width = sensor.width;
    let height = sensor.height;
    debug!("Demosaicing {}x{} sensor data ({:?})", width, height, sensor.cfa);

    if sensor.data.len() != width * height {
        return Err(ReflectanceError::DecodeError(format!(
            "sensor data holds {} samples for {}x{} photosites",
            sensor.data.len(),
            width,
            height
        )));
    }

    let bayer_bytes: Vec<u8> = sensor.data.iter().flat_map(|&v| v.to_le_bytes()).collect();
    let mut output_buf = vec![0u8; width * height * 3 * 2];
    let mut cursor = Cursor::new(&bayer_bytes[..]);

    {
        let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output_buf);
        bayer::run_demosaic(
            &mut cursor,
            BayerDepth::Depth16LE,
            sensor.cfa,
            Demosaic::Linear,
            &mut output_raster,
        )
        .map_err(|e| ReflectanceError::DecodeError(format!("Demosaic failed: {:?}", e)))?;
    }

    let black_level = sensor.black_level;
    let range = (sensor.white_level - black_level).max(1.0);

    let rgb: Vec<f32> = output_buf
        .chunks_exact(2)
        .map(|bytes| {
            let value = u16::from_le_bytes([bytes[0], bytes[1]]) as f32;
            (value - black_level).max(0.0) / range
        })
        .collect();

    RasterImage::new(width, height, ChannelLayout::Rgb, rgb)
}
