use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::debug;

use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::common::raster::{ChannelLayout, RasterImage};

/// Parsed PFM header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PfmHeader {
    pub layout: ChannelLayout,
    pub width: usize,
    pub height: usize,
    /// Absolute value of the scale line
    pub scale: f32,
    pub little_endian: bool,
}

/// Splits the next whitespace-delimited token off `data` starting at `*pos`.
fn next_token<'a>(data: &'a [u8], pos: &mut usize) -> Result<&'a str> {
    while *pos < data.len() && data[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    let start = *pos;
    while *pos < data.len() && !data[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    if start == *pos {
        return Err(ReflectanceError::InvalidFloatImage("truncated header".into()));
    }
    std::str::from_utf8(&data[start..*pos])
        .map_err(|_| ReflectanceError::InvalidFloatImage("header is not ASCII".into()))
}

fn parse_number<T: std::str::FromStr>(token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| ReflectanceError::InvalidFloatImage(format!("bad {}: '{}'", what, token)))
}

/// Parses the header and returns it with the offset of the first sample.
fn parse_header(data: &[u8]) -> Result<(PfmHeader, usize)> {
    let mut pos = 0;

    let layout = match next_token(data, &mut pos)? {
        "PF" => ChannelLayout::Rgb,
        "Pf" => ChannelLayout::Gray,
        other => {
            return Err(ReflectanceError::InvalidFloatImage(format!(
                "unknown type '{}'",
                other
            )));
        }
    };
    let width: usize = parse_number(next_token(data, &mut pos)?, "width")?;
    let height: usize = parse_number(next_token(data, &mut pos)?, "height")?;
    let scale: f32 = parse_number(next_token(data, &mut pos)?, "scale")?;

    if width == 0 || height == 0 {
        return Err(ReflectanceError::InvalidDimensions(width, height));
    }
    if scale == 0.0 || !scale.is_finite() {
        return Err(ReflectanceError::InvalidFloatImage(format!("bad scale {}", scale)));
    }

    // Exactly one whitespace byte separates the scale from the samples.
    if pos >= data.len() || !data[pos].is_ascii_whitespace() {
        return Err(ReflectanceError::InvalidFloatImage("missing sample data".into()));
    }
    pos += 1;

    Ok((
        PfmHeader {
            layout,
            width,
            height,
            scale: scale.abs(),
            little_endian: scale < 0.0,
        },
        pos,
    ))
}

/// Decodes a PFM image held in memory.
pub fn read_pfm(data: &[u8]) -> Result<RasterImage> {
    let (header, offset) = parse_header(data)?;
    debug!(
        width = header.width,
        height = header.height,
        little_endian = header.little_endian,
        "Decoding PFM"
    );

    let overflow = || ReflectanceError::InvalidFloatImage("dimensions overflow".into());
    let row_len = header.width.checked_mul(header.layout.count()).ok_or_else(overflow)?;
    let sample_count = row_len.checked_mul(header.height).ok_or_else(overflow)?;
    let byte_count = sample_count.checked_mul(4).ok_or_else(overflow)?;

    let payload = &data[offset..];
    if payload.len() < byte_count {
        return Err(ReflectanceError::InvalidFloatImage(format!(
            "expected {} bytes of samples, found {}",
            byte_count,
            payload.len()
        )));
    }

    let mut stored = vec![0.0f32; sample_count];
    if header.little_endian {
        LittleEndian::read_f32_into(&payload[..byte_count], &mut stored);
    } else {
        BigEndian::read_f32_into(&payload[..byte_count], &mut stored);
    }

    // Stored bottom row first; flip to top row first.
    let samples = stored
        .chunks_exact(row_len)
        .rev()
        .flatten()
        .copied()
        .collect();

    RasterImage::new(header.width, header.height, header.layout, samples)
}

pub fn read_pfm_file<P: AsRef<Path>>(path: P) -> Result<RasterImage> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| ReflectanceError::InputReadError(format!("{}: {}", path.display(), e)))?;
    read_pfm(&data)
}
