//! Floating-point raster images
//!
//! `RasterImage` is the buffer every reflectance stage consumes and produces.
//! Samples are stored row-major, top row first, with colour channels interleaved
//! in red-green-blue order.

use rayon::prelude::*;

use crate::image_pipeline::common::error::{ReflectanceError, Result};

/// Number and meaning of the channels stored per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// One scalar sample per pixel
    Gray,
    /// Red, green and blue samples per pixel
    Rgb,
}

impl ChannelLayout {
    pub fn count(self) -> usize {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::Rgb => 3,
        }
    }
}

/// Colour channel of an RGB raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Offset of the channel inside an interleaved RGB pixel.
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    layout: ChannelLayout,
    data: Vec<f32>,
}

impl RasterImage {
    /// Wraps an interleaved sample buffer, checking that its length matches the shape.
    pub fn new(width: usize, height: usize, layout: ChannelLayout, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ReflectanceError::InvalidDimensions(width, height));
        }
        let expected = width * height * layout.count();
        if data.len() != expected {
            return Err(ReflectanceError::InvalidFloatImage(format!(
                "{}x{} {:?} image needs {} samples, got {}",
                width,
                height,
                layout,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Image with every sample set to `value`. Dimensions are not checked; use
    /// [`RasterImage::new`] for sizes that come from outside the crate.
    pub fn filled(width: usize, height: usize, layout: ChannelLayout, value: f32) -> Self {
        Self {
            width,
            height,
            layout,
            data: vec![value; width * height * layout.count()],
        }
    }

    pub fn zeros(width: usize, height: usize, layout: ChannelLayout) -> Self {
        Self::filled(width, height, layout, 0.0)
    }

    /// Builds an RGB image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn_rgb(width: usize, height: usize, f: impl Fn(usize, usize) -> [f32; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            layout: ChannelLayout::Rgb,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn channels(&self) -> usize {
        self.layout.count()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<f32> {
        self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> &[f32] {
        let start = self.offset(x, y);
        &self.data[start..start + self.channels()]
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [f32] {
        let start = self.offset(x, y);
        let channels = self.channels();
        &mut self.data[start..start + channels]
    }

    /// Reads one sample. Gray images ignore `channel`.
    pub fn sample(&self, x: usize, y: usize, channel: Channel) -> f32 {
        match self.layout {
            ChannelLayout::Gray => self.data[self.offset(x, y)],
            ChannelLayout::Rgb => self.data[self.offset(x, y) + channel.index()],
        }
    }

    pub fn set_sample(&mut self, x: usize, y: usize, channel: Channel, value: f32) {
        let idx = match self.layout {
            ChannelLayout::Gray => self.offset(x, y),
            ChannelLayout::Rgb => self.offset(x, y) + channel.index(),
        };
        self.data[idx] = value;
    }

    pub fn pixels(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.channels())
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.channels()
    }

    pub fn ensure_same_shape(&self, other: &RasterImage) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(ReflectanceError::DimensionMismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        if self.layout != other.layout {
            return Err(ReflectanceError::ChannelMismatch {
                expected: self.channels(),
                found: other.channels(),
            });
        }
        Ok(())
    }

    /// Applies `f` to every sample.
    pub fn map(&self, f: impl Fn(f32) -> f32 + Sync + Send) -> RasterImage {
        RasterImage {
            width: self.width,
            height: self.height,
            layout: self.layout,
            data: self.data.par_iter().map(|&v| f(v)).collect(),
        }
    }

    /// Applies `f` to every pixel, in place.
    pub fn map_pixels_in_place(&mut self, f: impl Fn(&mut [f32]) + Sync + Send) {
        let channels = self.channels();
        self.data.par_chunks_mut(channels).for_each(f);
    }

    /// Combines two images of identical shape sample by sample.
    pub fn zip_map(
        &self,
        other: &RasterImage,
        f: impl Fn(f32, f32) -> f32 + Sync + Send,
    ) -> Result<RasterImage> {
        self.ensure_same_shape(other)?;
        Ok(RasterImage {
            width: self.width,
            height: self.height,
            layout: self.layout,
            data: self
                .data
                .par_iter()
                .zip(other.data.par_iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    pub fn add(&self, other: &RasterImage) -> Result<RasterImage> {
        self.zip_map(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &RasterImage) -> Result<RasterImage> {
        self.zip_map(other, |a, b| a - b)
    }

    pub fn mul(&self, other: &RasterImage) -> Result<RasterImage> {
        self.zip_map(other, |a, b| a * b)
    }

    /// Elementwise division. Zero denominators yield inf/NaN samples.
    pub fn div(&self, other: &RasterImage) -> Result<RasterImage> {
        self.zip_map(other, |a, b| a / b)
    }

    pub fn powf(&self, exponent: f32) -> RasterImage {
        self.map(|v| v.powf(exponent))
    }

    pub fn scale(&self, factor: f32) -> RasterImage {
        self.map(|v| v * factor)
    }

    /// Extracts one channel as a gray image.
    pub fn channel(&self, channel: Channel) -> RasterImage {
        let data = match self.layout {
            ChannelLayout::Gray => self.data.clone(),
            ChannelLayout::Rgb => self.pixels().map(|p| p[channel.index()]).collect(),
        };
        RasterImage {
            width: self.width,
            height: self.height,
            layout: ChannelLayout::Gray,
            data,
        }
    }

    pub fn split_channels(&self) -> Vec<RasterImage> {
        match self.layout {
            ChannelLayout::Gray => vec![self.clone()],
            ChannelLayout::Rgb => Channel::ALL.iter().map(|&c| self.channel(c)).collect(),
        }
    }

    /// Interleaves three gray images into one RGB image.
    pub fn merge_channels(red: &RasterImage, green: &RasterImage, blue: &RasterImage) -> Result<RasterImage> {
        for plane in [red, green, blue] {
            red.ensure_same_shape(plane)?;
            if plane.layout != ChannelLayout::Gray {
                return Err(ReflectanceError::ChannelMismatch {
                    expected: 1,
                    found: plane.channels(),
                });
            }
        }
        let data = red
            .data
            .iter()
            .zip(&green.data)
            .zip(&blue.data)
            .flat_map(|((&r, &g), &b)| [r, g, b])
            .collect();
        Ok(RasterImage {
            width: red.width,
            height: red.height,
            layout: ChannelLayout::Rgb,
            data,
        })
    }

    /// Broadcasts a gray image to three identical channels.
    pub fn to_rgb(&self) -> RasterImage {
        match self.layout {
            ChannelLayout::Rgb => self.clone(),
            ChannelLayout::Gray => RasterImage {
                width: self.width,
                height: self.height,
                layout: ChannelLayout::Rgb,
                data: self.data.iter().flat_map(|&v| [v, v, v]).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> RasterImage {
        RasterImage::from_fn_rgb(width, height, |x, y| {
            let base = (y * width + x) as f32;
            [base, base + 0.25, base + 0.5]
        })
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let result = RasterImage::new(2, 2, ChannelLayout::Rgb, vec![0.0; 11]);
        assert!(matches!(result, Err(ReflectanceError::InvalidFloatImage(_))));
    }

    #[test]
    fn test_new_rejects_empty_dimensions() {
        let result = RasterImage::new(0, 4, ChannelLayout::Gray, Vec::new());
        assert!(matches!(result, Err(ReflectanceError::InvalidDimensions(0, 4))));
    }

    #[test]
    fn test_pixel_addressing_is_row_major() {
        let image = ramp(3, 2);
        assert_eq!(image.pixel(2, 1), &[5.0, 5.25, 5.5]);
        assert_eq!(image.sample(1, 0, Channel::Blue), 1.5);
    }

    #[test]
    fn test_arithmetic_requires_same_shape() {
        let a = ramp(3, 2);
        let b = ramp(2, 3);
        assert!(matches!(
            a.sub(&b),
            Err(ReflectanceError::DimensionMismatch { .. })
        ));

        let gray = RasterImage::zeros(3, 2, ChannelLayout::Gray);
        assert!(matches!(
            a.add(&gray),
            Err(ReflectanceError::ChannelMismatch { expected: 3, found: 1 })
        ));
    }

    #[test]
    fn test_elementwise_operations() {
        let a = ramp(2, 2);
        let twos = RasterImage::filled(2, 2, ChannelLayout::Rgb, 2.0);

        let diff = a.sub(&twos).unwrap();
        assert_eq!(diff.pixel(1, 1), &[1.0, 1.25, 1.5]);

        let quotient = a.div(&twos).unwrap();
        assert_eq!(quotient.pixel(0, 1), &[1.0, 1.125, 1.25]);

        let squared = twos.powf(2.0);
        assert!(squared.data().iter().all(|&v| v == 4.0));
    }

    #[test]
    fn test_split_and_merge_channels() {
        let image = ramp(2, 3);
        let planes = image.split_channels();
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[1].sample(1, 2, Channel::Red), 5.25);

        let merged = RasterImage::merge_channels(&planes[0], &planes[1], &planes[2]).unwrap();
        assert_eq!(merged, image);
    }
}
