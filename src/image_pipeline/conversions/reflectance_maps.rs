use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::image_pipeline::{
    common::{
        error::{ReflectanceError, Result},
        mask::Mask,
        raster::RasterImage,
    },
    conversions::{
        dataset::{Acquisition, PolarizedCaptures},
        timing::PipelineTimings,
        types::PipelineConfig,
    },
    output::{FloatImageWriter, NormalMapWriter, StandardNormalMapWriter},
    pfm::PfmWriter,
    photo::{AutoPhotoReader, Photo, PhotoReader},
    reflectance::{
        AlbedoMaps, AlignedNormals, CheckerchartCalibration, GradientIlluminationSet,
        SpecularGradients, align_average_normal, calibrate_set, estimate_normals,
        estimate_roughness, remove_ambient_illumination, separate_diffuse_specular,
    },
};

/// Result maps of one acquisition.
#[derive(Debug, Clone)]
pub struct ReflectanceMaps {
    pub albedo: AlbedoMaps,
    pub normals: AlignedNormals,
    pub roughness: RasterImage,
}

pub struct ReflectancePipeline<R: PhotoReader, F: FloatImageWriter, N: NormalMapWriter> {
    reader: R,
    float_writer: F,
    normal_writer: N,
    config: PipelineConfig,
}

impl ReflectancePipeline<AutoPhotoReader, PfmWriter, StandardNormalMapWriter> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            reader: AutoPhotoReader::new(),
            float_writer: PfmWriter,
            normal_writer: StandardNormalMapWriter,
            config,
        }
    }
}

impl<R: PhotoReader, F: FloatImageWriter, N: NormalMapWriter> ReflectancePipeline<R, F, N> {
    pub fn with_custom(reader: R, float_writer: F, normal_writer: N, config: PipelineConfig) -> Self {
        Self {
            reader,
            float_writer,
            normal_writer,
            config,
        }
    }

    fn read_photo_file(&self, path: &Path) -> Result<Photo> {
        debug!(path = %path.display(), "Reading photograph");
        let data = std::fs::read(path)
            .map_err(|e| ReflectanceError::InputReadError(format!("{}: {}", path.display(), e)))?;

        self.reader.read_photo(&data).map_err(|e| match e {
            ReflectanceError::DecodeError(msg) => {
                ReflectanceError::DecodeError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    fn read_captures(&self, capture_paths: &[PathBuf], ambient_path: &Path) -> Result<PolarizedCaptures> {
        let captures = capture_paths
            .iter()
            .map(|path| self.read_photo_file(path))
            .collect::<Result<Vec<_>>>()?;
        let ambient = self.read_photo_file(ambient_path)?;
        Ok(PolarizedCaptures { captures, ambient })
    }

    /// Reads every input of the acquisition rooted at `root`.
    #[instrument(skip(self, root), fields(path = %root.as_ref().display()))]
    pub fn load_acquisition<P: AsRef<Path>>(&self, root: P) -> Result<Acquisition> {
        let root = root.as_ref();
        let layout = &self.config.layout;
        info!("Loading acquisition");

        let parallel = {
            let _span = tracing::info_span!("read_parallel").entered();
            self.read_captures(&layout.parallel_capture_paths(root), &layout.parallel_ambient_path(root))?
        };

        let cross = if self.config.cross_polarized {
            let _span = tracing::info_span!("read_cross").entered();
            Some(self.read_captures(&layout.cross_capture_paths(root), &layout.cross_ambient_path(root))?)
        } else {
            None
        };

        let mask = {
            let _span = tracing::info_span!("read_mask").entered();
            self.read_photo_file(&layout.mask_path(root))?.image
        };

        let calibration = {
            let _span = tracing::info_span!("read_calibration").entered();
            CheckerchartCalibration::read(layout.calibration_path(root))?
        };
        if cross.is_some() {
            calibration.cross_record()?;
        }

        let acquisition = Acquisition {
            parallel,
            cross,
            mask,
            calibration,
        };
        self.validate_dimensions(&acquisition)?;

        let (width, height) = acquisition.mask.dimensions();
        info!(width, height, cross = acquisition.cross.is_some(), "Acquisition loaded");
        Ok(acquisition)
    }

    fn validate_dimensions(&self, acquisition: &Acquisition) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        let expected = acquisition.mask.dimensions();
        if expected.0 == 0 || expected.1 == 0 {
            return Err(ReflectanceError::InvalidDimensions(expected.0, expected.1));
        }

        for image in acquisition.images() {
            let found = image.dimensions();
            if found != expected {
                return Err(ReflectanceError::DimensionMismatch { expected, found });
            }
        }
        Ok(())
    }

    /// Linearizes display-encoded captures, then subtracts the ambient capture and
    /// clamps negative pixels. The ambient is linearized only with `linearize_ambient`.
    pub fn preprocess(&self, captures: PolarizedCaptures) -> Result<GradientIlluminationSet> {
        let gamma = self.config.gamma;
        let ambient = if self.config.linearize_ambient {
            captures.ambient.linearize(gamma)
        } else {
            captures.ambient.image
        };

        let set = GradientIlluminationSet::from_captures(
            captures
                .captures
                .into_iter()
                .map(|photo| photo.linearize(gamma))
                .collect(),
        )?;
        remove_ambient_illumination(set, &ambient)
    }

    /// Runs every reflectance stage on a loaded acquisition.
    pub fn compute_maps(&self, acquisition: Acquisition) -> Result<ReflectanceMaps> {
        let mut timings = PipelineTimings::new();
        self.compute_maps_timed(acquisition, &mut timings)
    }

    #[instrument(skip_all)]
    fn compute_maps_timed(&self, acquisition: Acquisition, timings: &mut PipelineTimings) -> Result<ReflectanceMaps> {
        self.validate_dimensions(&acquisition)?;
        let Acquisition {
            parallel,
            cross,
            mask,
            calibration,
        } = acquisition;

        let mask = Mask::from_image(&mask);
        info!(selected = mask.selected_count(), "Mask prepared");
        if mask.selected_count() == 0 {
            warn!("Mask selects no pixel");
        }

        let (parallel, cross) = timings.measure("preprocess", || -> Result<_> {
            let _span = tracing::info_span!("preprocess").entered();
            let parallel = self.preprocess(parallel)?;
            let cross = cross.map(|captures| self.preprocess(captures)).transpose()?;
            Ok((parallel, cross))
        })?;

        let (parallel, cross) = timings.measure("calibrate", || -> Result<_> {
            let _span = tracing::info_span!("calibrate").entered();
            let parallel = calibrate_set(parallel, &calibration.parallel, &mask)?;
            let cross = match cross {
                Some(set) => Some(calibrate_set(set, &calibration.cross_record()?, &mask)?),
                None => None,
            };
            Ok((parallel, cross))
        })?;

        let albedo = timings.measure("separate", || {
            let _span = tracing::info_span!("separate").entered();
            separate_diffuse_specular(&parallel.flat, cross.as_ref().map(|set| &set.flat), &mask)
        })?;

        let gradients = match &cross {
            Some(cross) if self.config.subtract_cross_gradients => {
                SpecularGradients::from_difference(&parallel, cross)?
            }
            _ => SpecularGradients::from_parallel(&parallel),
        };
        debug!(source = ?gradients.source, "Gradient source selected");

        let normals = timings.measure("estimate_normals", || {
            let _span = tracing::info_span!("estimate_normals").entered();
            estimate_normals(&gradients, self.config.normal_estimation())
        })?;

        let normals = timings.measure("align_normals", || {
            let _span = tracing::info_span!("align_normals").entered();
            align_average_normal(&normals, &mask)
        })?;

        let roughness = timings.measure("estimate_roughness", || {
            let _span = tracing::info_span!("estimate_roughness").entered();
            estimate_roughness(&gradients, &parallel.curvature_x, &parallel.curvature_y)
        })?;

        Ok(ReflectanceMaps {
            albedo,
            normals,
            roughness,
        })
    }

    fn write_float_map(&self, image: &RasterImage, dir: &Path, name: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{}.{}", name, self.float_writer.extension()));
        let file = File::create(&path)
            .map_err(|e| ReflectanceError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
        let mut output = BufWriter::new(file);
        self.float_writer.write_float_image(image, &mut output)?;
        output.flush()?;
        debug!(path = %path.display(), "Wrote map");
        Ok(path)
    }

    /// Writes the result maps into `dir`, creating it if needed, and returns the written paths.
    #[instrument(skip(self, maps, dir), fields(path = %dir.as_ref().display()))]
    pub fn write_maps<P: AsRef<Path>>(&self, maps: &ReflectanceMaps, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .map_err(|e| ReflectanceError::OutputWriteError(format!("{}: {}", dir.display(), e)))?;

        let mut written = Vec::new();
        if let Some(diffuse) = &maps.albedo.diffuse {
            written.push(self.write_float_map(diffuse, dir, "diffuse")?);
        }
        written.push(self.write_float_map(&maps.albedo.specular, dir, "specular")?);
        written.push(self.write_float_map(&maps.roughness, dir, "roughness")?);

        let output_config = &self.config.output;
        let normal_path = dir.join(format!("normalMap.{}", output_config.normal_map_format.extension()));
        let file = File::create(&normal_path)
            .map_err(|e| ReflectanceError::OutputWriteError(format!("{}: {}", normal_path.display(), e)))?;
        let mut output = BufWriter::new(file);
        self.normal_writer
            .write_normal_map(&maps.normals.normals, &mut output, output_config)?;
        output.flush()?;
        written.push(normal_path);

        info!(count = written.len(), "Result maps written");
        Ok(written)
    }

    fn execute(&self, root: &Path, timings: &mut PipelineTimings) -> Result<Vec<PathBuf>> {
        let acquisition = timings.measure("load_inputs", || self.load_acquisition(root))?;
        let maps = self.compute_maps_timed(acquisition, timings)?;
        let output_dir = self.config.layout.output_path(root);
        timings.measure("write_outputs", || self.write_maps(&maps, &output_dir))
    }

    /// Loads the acquisition at `root`, computes every map and writes them to the output directory.
    #[instrument(skip(self, root), fields(path = %root.as_ref().display()))]
    pub fn run<P: AsRef<Path>>(&self, root: P) -> Result<Vec<PathBuf>> {
        let mut timings = PipelineTimings::new();
        self.execute(root.as_ref(), &mut timings)
    }

    #[instrument(skip(self, root), fields(path = %root.as_ref().display()))]
    pub fn run_with_timings<P: AsRef<Path>>(&self, root: P) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        self.execute(root.as_ref(), &mut timings)?;

        info!(
            "Reflectance maps complete in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok(timings)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }
}
