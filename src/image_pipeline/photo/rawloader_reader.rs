//! Camera RAW reader built on the rawloader library.
//!
//! Supports any format rawloader decodes (ARW, CR2, NEF, DNG, ...). Bayer
//! sensor data is demosaiced into linear RGB; the photograph keeps the
//! sensor's linear response, so no gamma is removed afterwards.

use std::io::Cursor;

use rawloader::RawImageData as RawloaderImageData;
use tracing::{debug, warn};

use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::common::raster::{ChannelLayout, RasterImage};
use crate::image_pipeline::photo::debayer::{SensorData, cfa_from_name, demosaic};
use crate::image_pipeline::photo::reader::PhotoReader;
use crate::image_pipeline::photo::types::{Photo, Transfer};

pub struct RawLoaderReader;

impl RawLoaderReader {
    fn decode(&self, data: &[u8]) -> Result<rawloader::RawImage> {
        rawloader::decode(&mut Cursor::new(data)).map_err(|e| ReflectanceError::DecodeError(e.to_string()))
    }
}

impl PhotoReader for RawLoaderReader {
    fn read_photo(&self, data: &[u8]) -> Result<Photo> {
        debug!("Decoding RAW image, {} bytes", data.len());

        let decoded = self.decode(data)?;
        let width = decoded.width;
        let height = decoded.height;
        debug!("Decoded image: {}x{}, {} component(s) per pixel", width, height, decoded.cpp);

        // Float data is normalized 0.0-1.0 and scaled to the u16 range
        let (samples, black_level, white_level): (Vec<u16>, f32, f32) = match decoded.data {
            RawloaderImageData::Integer(values) => {
                let black = decoded.blacklevels.iter().copied().min().unwrap_or(0) as f32;
                let white = decoded.whitelevels.iter().copied().max().unwrap_or(u16::MAX) as f32;
                (values, black, white)
            }
            RawloaderImageData::Float(values) => (
                values.iter().map(|&v| (v.clamp(0.0, 1.0) * u16::MAX as f32) as u16).collect(),
                0.0,
                u16::MAX as f32,
            ),
        };
        debug!("Black level: {}, white level: {}", black_level, white_level);

        let image = match decoded.cpp {
            1 => {
                let cfa = cfa_from_name(&decoded.cfa.name).unwrap_or_else(|| {
                    warn!("Unrecognized CFA pattern {:?}, assuming RGGB", decoded.cfa.name);
                    bayer::CFA::RGGB
                });
                demosaic(&SensorData {
                    width,
                    height,
                    data: samples,
                    cfa,
                    black_level,
                    white_level,
                })?
            }
            3 => {
                let range = (white_level - black_level).max(1.0);
                let rgb = samples
                    .iter()
                    .map(|&v| (v as f32 - black_level).max(0.0) / range)
                    .collect();
                RasterImage::new(width, height, ChannelLayout::Rgb, rgb)?
            }
            other => {
                return Err(ReflectanceError::UnsupportedFormat(format!(
                    "RAW image with {} components per pixel",
                    other
                )));
            }
        };

        Ok(Photo {
            image,
            transfer: Transfer::Linear,
        })
    }
}
