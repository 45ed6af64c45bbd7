use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::common::raster::{Channel, ChannelLayout, RasterImage};

/// A pixel belongs to the sample when the mask's reference channel exceeds this value.
pub const MASK_THRESHOLD: f32 = 0.9;

/// Channel of an RGB mask photograph that gates membership.
///
/// Acquisition masks are addressed as the third channel of a blue-green-red
/// buffer, which is red in this crate's channel order.
pub const MASK_REFERENCE_CHANNEL: Channel = Channel::Red;

/// Binary region of interest derived from a mask photograph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    inside: Vec<bool>,
}

impl Mask {
    pub fn from_image(image: &RasterImage) -> Self {
        let inside = match image.layout() {
            ChannelLayout::Gray => image.data().iter().map(|&v| v > MASK_THRESHOLD).collect(),
            ChannelLayout::Rgb => image
                .pixels()
                .map(|p| p[MASK_REFERENCE_CHANNEL.index()] > MASK_THRESHOLD)
                .collect(),
        };
        Self {
            width: image.width(),
            height: image.height(),
            inside,
        }
    }

    /// Mask selecting every pixel.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            inside: vec![true; width * height],
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

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.inside[y * self.width + x]
    }

    /// Membership flags in row-major pixel order.
    pub fn flags(&self) -> &[bool] {
        &self.inside
    }

    pub fn selected_count(&self) -> usize {
        self.inside.iter().filter(|&&v| v).count()
    }

    pub fn ensure_covers(&self, image: &RasterImage) -> Result<()> {
        if self.dimensions() != image.dimensions() {
            return Err(ReflectanceError::DimensionMismatch {
                expected: self.dimensions(),
                found: image.dimensions(),
            });
        }
        Ok(())
    }
}
