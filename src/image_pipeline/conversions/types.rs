//! Reflectance pipeline configuration types

use crate::image_pipeline::conversions::dataset::DatasetLayout;
use crate::image_pipeline::output::{NormalMapFormat, OutputConfig, TiffCompression};
use crate::image_pipeline::reflectance::{DEFAULT_GAMMA, NormalEstimation};

/// Configuration for a reflectance pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Gamma removed from display-encoded photographs
    pub gamma: f32,
    /// Whether a cross-polarized set was captured
    pub cross_polarized: bool,
    /// Feed parallel minus cross gradients to the normal and roughness estimators.
    /// Ignored without cross-polarized data.
    pub subtract_cross_gradients: bool,
    /// Clamp `x² + y²` into [0, 1] before the normal's square root
    pub clamp_reflection: bool,
    /// Remove gamma from the ambient captures as well
    pub linearize_ambient: bool,
    pub output: OutputConfig,
    /// Whether to check that every input shares the mask's dimensions after loading
    pub validate_dimensions: bool,
    pub layout: DatasetLayout,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gamma: DEFAULT_GAMMA,
            cross_polarized: true,
            subtract_cross_gradients: true,
            clamp_reflection: false,
            linearize_ambient: false,
            output: OutputConfig::default(),
            validate_dimensions: true,
            layout: DatasetLayout::default(),
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn normal_estimation(&self) -> NormalEstimation {
        NormalEstimation {
            clamp_reflection: self.clamp_reflection,
        }
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    gamma: Option<f32>,
    cross_polarized: Option<bool>,
    subtract_cross_gradients: Option<bool>,
    clamp_reflection: Option<bool>,
    linearize_ambient: Option<bool>,
    normal_map_format: Option<NormalMapFormat>,
    tiff_compression: Option<TiffCompression>,
    tiff_predictor: Option<Option<u16>>,
    validate_dimensions: Option<bool>,
    layout: Option<DatasetLayout>,
}

impl PipelineConfigBuilder {
    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = Some(gamma);
        self
    }

    pub fn cross_polarized(mut self, enable: bool) -> Self {
        self.cross_polarized = Some(enable);
        self
    }

    pub fn subtract_cross_gradients(mut self, enable: bool) -> Self {
        self.subtract_cross_gradients = Some(enable);
        self
    }

    pub fn clamp_reflection(mut self, enable: bool) -> Self {
        self.clamp_reflection = Some(enable);
        self
    }

    pub fn linearize_ambient(mut self, enable: bool) -> Self {
        self.linearize_ambient = Some(enable);
        self
    }

    pub fn normal_map_format(mut self, format: NormalMapFormat) -> Self {
        self.normal_map_format = Some(format);
        self
    }

    pub fn tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = Some(compression);
        self
    }

    pub fn tiff_predictor(mut self, predictor: Option<u16>) -> Self {
        self.tiff_predictor = Some(predictor);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn layout(mut self, layout: DatasetLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            gamma: self.gamma.unwrap_or(default.gamma),
            cross_polarized: self.cross_polarized.unwrap_or(default.cross_polarized),
            subtract_cross_gradients: self
                .subtract_cross_gradients
                .unwrap_or(default.subtract_cross_gradients),
            clamp_reflection: self.clamp_reflection.unwrap_or(default.clamp_reflection),
            linearize_ambient: self.linearize_ambient.unwrap_or(default.linearize_ambient),
            output: OutputConfig {
                normal_map_format: self
                    .normal_map_format
                    .unwrap_or(default.output.normal_map_format),
                tiff_compression: self
                    .tiff_compression
                    .unwrap_or(default.output.tiff_compression),
                tiff_predictor: self.tiff_predictor.unwrap_or(default.output.tiff_predictor),
            },
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            layout: self.layout.unwrap_or(default.layout),
        }
    }
}
