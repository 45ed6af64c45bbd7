//! Pipeline orchestration module
//!
//! Loads an acquisition from disk, threads it through the reflectance stages
//! and writes the result maps.

pub mod dataset;
mod reflectance_maps;
#[cfg(test)]
mod tests;
pub mod timing;
pub mod types;

pub use dataset::{Acquisition, DatasetLayout, PolarizedCaptures};
pub use reflectance_maps::{ReflectanceMaps, ReflectancePipeline};
pub use timing::{PipelineTimings, StepTiming};
pub use types::{PipelineConfig, PipelineConfigBuilder};
