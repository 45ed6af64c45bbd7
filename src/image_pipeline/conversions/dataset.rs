//! On-disk layout of an acquisition and the loaded inputs

use std::path::{Path, PathBuf};

use crate::image_pipeline::common::raster::RasterImage;
use crate::image_pipeline::photo::Photo;
use crate::image_pipeline::reflectance::{CheckerchartCalibration, GRADIENT_CAPTURE_COUNT};

/// Where the photographs of one acquisition live, relative to its root.
///
/// Captures are numbered consecutively in slot order: flat, +x, -x, +y, -y,
/// curvature x, curvature y.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub parallel_dir: String,
    pub cross_dir: String,
    pub file_prefix: String,
    pub extension: String,
    pub parallel_start: u32,
    pub cross_start: u32,
    pub ambient_name: String,
    pub mask_name: String,
    pub calibration_file: String,
    pub output_dir: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            parallel_dir: "par".to_string(),
            cross_dir: "cross".to_string(),
            file_prefix: "IMG_".to_string(),
            extension: "JPG".to_string(),
            parallel_start: 2855,
            cross_start: 2869,
            ambient_name: "ambient".to_string(),
            mask_name: "normalMask".to_string(),
            calibration_file: "checker.txt".to_string(),
            output_dir: "textures".to_string(),
        }
    }
}

impl DatasetLayout {
    pub fn with_directories(mut self, parallel: impl Into<String>, cross: impl Into<String>) -> Self {
        self.parallel_dir = parallel.into();
        self.cross_dir = cross.into();
        self
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_parallel_start(mut self, start: u32) -> Self {
        self.parallel_start = start;
        self
    }

    pub fn with_cross_start(mut self, start: u32) -> Self {
        self.cross_start = start;
        self
    }

    pub fn with_ambient_name(mut self, name: impl Into<String>) -> Self {
        self.ambient_name = name.into();
        self
    }

    pub fn with_mask_name(mut self, name: impl Into<String>) -> Self {
        self.mask_name = name.into();
        self
    }

    pub fn with_calibration_file(mut self, name: impl Into<String>) -> Self {
        self.calibration_file = name.into();
        self
    }

    pub fn with_output_dir(mut self, name: impl Into<String>) -> Self {
        self.output_dir = name.into();
        self
    }

    fn capture_paths(&self, root: &Path, dir: &str, start: u32) -> Vec<PathBuf> {
        (0..GRADIENT_CAPTURE_COUNT as u32)
            .map(|slot| {
                root.join(dir)
                    .join(format!("{}{}.{}", self.file_prefix, start + slot, self.extension))
            })
            .collect()
    }

    pub fn parallel_capture_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.capture_paths(root, &self.parallel_dir, self.parallel_start)
    }

    pub fn cross_capture_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.capture_paths(root, &self.cross_dir, self.cross_start)
    }

    pub fn parallel_ambient_path(&self, root: &Path) -> PathBuf {
        root.join(&self.parallel_dir)
            .join(format!("{}.{}", self.ambient_name, self.extension))
    }

    pub fn cross_ambient_path(&self, root: &Path) -> PathBuf {
        root.join(&self.cross_dir)
            .join(format!("{}.{}", self.ambient_name, self.extension))
    }

    pub fn mask_path(&self, root: &Path) -> PathBuf {
        root.join(format!("{}.{}", self.mask_name, self.extension))
    }

    pub fn calibration_path(&self, root: &Path) -> PathBuf {
        root.join(&self.calibration_file)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }
}

/// Seven gradient captures of one polarization and the matching ambient capture
#[derive(Debug, Clone)]
pub struct PolarizedCaptures {
    pub captures: Vec<Photo>,
    pub ambient: Photo,
}

impl PolarizedCaptures {
    pub fn images(&self) -> impl Iterator<Item = &RasterImage> {
        self.captures.iter().chain(std::iter::once(&self.ambient)).map(|photo| &photo.image)
    }
}

/// Every input of one run, as decoded from disk.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub parallel: PolarizedCaptures,
    pub cross: Option<PolarizedCaptures>,
    /// Region-of-interest image, values in [0, 1]
    pub mask: RasterImage,
    pub calibration: CheckerchartCalibration,
}

impl Acquisition {
    /// Every decoded image, parallel first, the mask last.
    pub fn images(&self) -> impl Iterator<Item = &RasterImage> {
        self.parallel
            .images()
            .chain(self.cross.iter().flat_map(|cross| cross.images()))
            .chain(std::iter::once(&self.mask))
    }
}
