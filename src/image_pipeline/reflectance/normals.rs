//! Normal estimation from opposing gradient illuminations.
//!
//! The difference between a gradient capture and its mirrored twin measures
//! where, along that axis, the light reaching the camera comes from. Using the
//! green channel of each difference gives the reflection vector's x and y; z is
//! inferred from unit length. The surface normal is the half vector between the
//! reflection vector and the view direction.

use glam::Vec3;
use rayon::prelude::*;

use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::common::raster::{Channel, ChannelLayout, RasterImage};
use crate::image_pipeline::reflectance::gradient_set::SpecularGradients;
use crate::image_pipeline::reflectance::preprocess::clamp;

/// Direction towards the camera.
pub const VIEW_DIRECTION: Vec3 = Vec3::Z;

/// Per-pixel unit vectors stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalMap {
    width: usize,
    height: usize,
    normals: Vec<Vec3>,
}

impl NormalMap {
    pub fn new(width: usize, height: usize, normals: Vec<Vec3>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ReflectanceError::InvalidDimensions(width, height));
        }
        if normals.len() != width * height {
            return Err(ReflectanceError::InvalidFloatImage(format!(
                "{}x{} normal map needs {} vectors, got {}",
                width,
                height,
                width * height,
                normals.len()
            )));
        }
        Ok(Self {
            width,
            height,
            normals,
        })
    }

    /// Map with every vector set to `normal`. Unlike [`NormalMap::new`] the
    /// dimensions are not checked; stages reject empty maps.
    pub fn filled(width: usize, height: usize, normal: Vec3) -> Self {
        Self {
            width,
            height,
            normals: vec![normal; width * height],
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

    pub fn get(&self, x: usize, y: usize) -> Vec3 {
        self.normals[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, normal: Vec3) {
        self.normals[y * self.width + x] = normal;
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn normals_mut(&mut self) -> &mut [Vec3] {
        &mut self.normals
    }

    /// Tristimulus view with x in red, y in green and z in blue.
    pub fn to_raster(&self) -> Result<RasterImage> {
        let data = self.normals.iter().flat_map(|n| n.to_array()).collect();
        RasterImage::new(self.width, self.height, ChannelLayout::Rgb, data)
    }

    /// Colour-codes the map into interleaved 8-bit RGB, `[-1, 1]` mapped onto `[0, 255]`.
    ///
    /// NaN components encode as 0.
    pub fn encode_rgb8(&self) -> Vec<u8> {
        self.normals
            .iter()
            .flat_map(|n| n.to_array())
            .map(|v| {
                let unit = clamp((v + 1.0) / 2.0, 0.0, 1.0);
                (unit * 255.0).round() as u8
            })
            .collect()
    }
}

/// Options for [`estimate_normals`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalEstimation {
    /// Clamp `x² + y²` into `[0, 1]` before inferring z. When off, pixels whose
    /// gradients exceed the unit disc produce NaN normals.
    pub clamp_reflection: bool,
}

/// Half vector for one pixel's horizontal and vertical gradient differences.
pub fn normal_from_gradients(x: f32, y: f32, options: NormalEstimation) -> Vec3 {
    let planar = x * x + y * y;
    let planar = if options.clamp_reflection {
        clamp(planar, 0.0, 1.0)
    } else {
        planar
    };
    let z = (1.0 - planar).sqrt();

    let reflection = Vec3::new(x, y, z);
    let reflection = reflection / reflection.length();

    let half = reflection + VIEW_DIRECTION;
    half / half.length()
}

/// Estimates the raw, unaligned normal map from the green channel of the gradients.
pub fn estimate_normals(gradients: &SpecularGradients, options: NormalEstimation) -> Result<NormalMap> {
    for image in [&gradients.minus_x, &gradients.plus_y, &gradients.minus_y] {
        gradients.plus_x.ensure_same_shape(image)?;
    }

    let green = |image: &RasterImage| image.channel(Channel::Green).into_raw();
    let plus_x = green(&gradients.plus_x);
    let minus_x = green(&gradients.minus_x);
    let plus_y = green(&gradients.plus_y);
    let minus_y = green(&gradients.minus_y);

    // x is mirrored in camera space
    let normals = (0..plus_x.len())
        .into_par_iter()
        .map(|i| {
            let x = minus_x[i] - plus_x[i];
            let y = plus_y[i] - minus_y[i];
            normal_from_gradients(x, y, options)
        })
        .collect();

    let (width, height) = gradients.plus_x.dimensions();
    NormalMap::new(width, height, normals)
}
