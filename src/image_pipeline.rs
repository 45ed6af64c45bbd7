//! Reflectance map pipeline module
//!
//! Decodes gradient-illumination photographs, recovers albedo, normals and
//! roughness, and writes them as PFM and 8-bit images.

pub mod common;
pub mod conversions;
pub mod output;
pub mod pfm;
pub mod photo;
pub mod reflectance;

pub use common::{Mask, RasterImage, ReflectanceError, Result};

pub use photo::{AutoPhotoReader, EncodedPhotoReader, Photo, PhotoReader, RawLoaderReader, Transfer};

pub use output::{
    FloatImageWriter, NormalMapFormat, NormalMapWriter, OutputConfig, StandardNormalMapWriter,
    TiffCompression,
};

pub use pfm::PfmWriter;

pub use conversions::{
    Acquisition, DatasetLayout, PipelineConfig, PipelineConfigBuilder, PipelineTimings,
    ReflectanceMaps, ReflectancePipeline,
};
