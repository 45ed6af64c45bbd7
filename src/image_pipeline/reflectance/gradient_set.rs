use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::common::raster::RasterImage;

/// Number of captures in one gradient illumination acquisition.
pub const GRADIENT_CAPTURE_COUNT: usize = 7;

/// The seven captures of one polarization, in acquisition order.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientIlluminationSet {
    /// Constant, full-on illumination
    pub flat: RasterImage,
    pub plus_x: RasterImage,
    pub minus_x: RasterImage,
    pub plus_y: RasterImage,
    pub minus_y: RasterImage,
    /// Second-order gradient along x
    pub curvature_x: RasterImage,
    /// Second-order gradient along y
    pub curvature_y: RasterImage,
}

impl GradientIlluminationSet {
    /// Builds a set from captures listed in acquisition order.
    pub fn from_captures(captures: Vec<RasterImage>) -> Result<Self> {
        let count = captures.len();
        let [flat, plus_x, minus_x, plus_y, minus_y, curvature_x, curvature_y]: [RasterImage;
            GRADIENT_CAPTURE_COUNT] = captures.try_into().map_err(|_| {
            ReflectanceError::InputReadError(format!(
                "gradient set needs {} captures, got {}",
                GRADIENT_CAPTURE_COUNT, count
            ))
        })?;

        let set = Self {
            flat,
            plus_x,
            minus_x,
            plus_y,
            minus_y,
            curvature_x,
            curvature_y,
        };
        set.ensure_consistent()?;
        Ok(set)
    }

    pub fn into_captures(self) -> [RasterImage; GRADIENT_CAPTURE_COUNT] {
        [
            self.flat,
            self.plus_x,
            self.minus_x,
            self.plus_y,
            self.minus_y,
            self.curvature_x,
            self.curvature_y,
        ]
    }

    pub fn captures(&self) -> [&RasterImage; GRADIENT_CAPTURE_COUNT] {
        [
            &self.flat,
            &self.plus_x,
            &self.minus_x,
            &self.plus_y,
            &self.minus_y,
            &self.curvature_x,
            &self.curvature_y,
        ]
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.flat.dimensions()
    }

    /// Transforms every capture, keeping slot order.
    pub fn try_map(self, mut f: impl FnMut(RasterImage) -> Result<RasterImage>) -> Result<Self> {
        let captures = self
            .into_captures()
            .into_iter()
            .map(&mut f)
            .collect::<Result<Vec<_>>>()?;
        Self::from_captures(captures)
    }

    pub fn map(self, mut f: impl FnMut(RasterImage) -> RasterImage) -> Self {
        let [flat, plus_x, minus_x, plus_y, minus_y, curvature_x, curvature_y] = self.into_captures();
        Self {
            flat: f(flat),
            plus_x: f(plus_x),
            minus_x: f(minus_x),
            plus_y: f(plus_y),
            minus_y: f(minus_y),
            curvature_x: f(curvature_x),
            curvature_y: f(curvature_y),
        }
    }

    fn ensure_consistent(&self) -> Result<()> {
        for capture in self.captures().iter().skip(1) {
            self.flat.ensure_same_shape(capture)?;
        }
        Ok(())
    }
}

/// Which acquisitions feed the gradient-based estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientSource {
    /// Parallel-polarized captures only (specular and diffuse mixed)
    ParallelOnly,
    /// Parallel minus cross-polarized captures (specular only)
    ParallelMinusCross,
}

/// First-order gradients and their flat reference, ready for normal and roughness estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecularGradients {
    pub source: GradientSource,
    pub flat: RasterImage,
    pub plus_x: RasterImage,
    pub minus_x: RasterImage,
    pub plus_y: RasterImage,
    pub minus_y: RasterImage,
}

impl SpecularGradients {
    pub fn from_parallel(parallel: &GradientIlluminationSet) -> Self {
        Self {
            source: GradientSource::ParallelOnly,
            flat: parallel.flat.clone(),
            plus_x: parallel.plus_x.clone(),
            minus_x: parallel.minus_x.clone(),
            plus_y: parallel.plus_y.clone(),
            minus_y: parallel.minus_y.clone(),
        }
    }

    pub fn from_difference(
        parallel: &GradientIlluminationSet,
        cross: &GradientIlluminationSet,
    ) -> Result<Self> {
        Ok(Self {
            source: GradientSource::ParallelMinusCross,
            flat: parallel.flat.sub(&cross.flat)?,
            plus_x: parallel.plus_x.sub(&cross.plus_x)?,
            minus_x: parallel.minus_x.sub(&cross.minus_x)?,
            plus_y: parallel.plus_y.sub(&cross.plus_y)?,
            minus_y: parallel.minus_y.sub(&cross.minus_y)?,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.flat.dimensions()
    }
}
