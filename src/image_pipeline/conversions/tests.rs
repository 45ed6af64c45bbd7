#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use approx::assert_relative_eq;
    use glam::Vec3;

    use crate::image_pipeline::common::error::{ReflectanceError, Result};
    use crate::image_pipeline::common::raster::{Channel, ChannelLayout, RasterImage};
    use crate::image_pipeline::conversions::{
        Acquisition, DatasetLayout, PipelineConfig, PipelineTimings, PolarizedCaptures,
        ReflectancePipeline,
    };
    use crate::image_pipeline::output::{
        FloatImageWriter, NormalMapFormat, NormalMapWriter, OutputConfig, TiffCompression,
    };
    use crate::image_pipeline::photo::{Photo, PhotoReader, Transfer};
    use crate::image_pipeline::reflectance::{CheckerchartCalibration, CheckerchartRecord, NormalMap};

    const SIZE: usize = 4;

    struct MockReader {
        should_fail: bool,
        read_sizes: Arc<Mutex<Vec<usize>>>,
    }

    impl PhotoReader for MockReader {
        fn read_photo(&self, data: &[u8]) -> Result<Photo> {
            if self.should_fail {
                return Err(ReflectanceError::DecodeError("Mock decode error".to_string()));
            }
            self.read_sizes.lock().unwrap().push(data.len());
            Ok(uniform_photo(SIZE, 1.0))
        }
    }

    struct MockFloatWriter {
        should_fail: bool,
        written: Arc<Mutex<Vec<RasterImage>>>,
    }

    impl FloatImageWriter for MockFloatWriter {
        fn write_float_image(&self, image: &RasterImage, _output: &mut dyn Write) -> Result<()> {
            if self.should_fail {
                return Err(ReflectanceError::EncodeError("Mock encode error".to_string()));
            }
            self.written.lock().unwrap().push(image.clone());
            Ok(())
        }

        fn extension(&self) -> &'static str {
            "mock"
        }
    }

    struct MockNormalWriter {
        written: Arc<Mutex<Vec<NormalMap>>>,
    }

    impl NormalMapWriter for MockNormalWriter {
        fn write_normal_map(&self, normals: &NormalMap, _output: &mut dyn Write, _config: &OutputConfig) -> Result<()> {
            self.written.lock().unwrap().push(normals.clone());
            Ok(())
        }
    }

    fn uniform_photo(size: usize, value: f32) -> Photo {
        Photo {
            image: RasterImage::filled(size, size, ChannelLayout::Rgb, value),
            transfer: Transfer::Linear,
        }
    }

    fn uniform_captures(value: f32) -> PolarizedCaptures {
        PolarizedCaptures {
            captures: (0..7).map(|_| uniform_photo(SIZE, value)).collect(),
            ambient: uniform_photo(SIZE, 0.0),
        }
    }

    fn calibration() -> CheckerchartCalibration {
        let record = CheckerchartRecord {
            observed: [0.5, 0.5, 0.5],
            target: 0.5,
        };
        CheckerchartCalibration {
            parallel: record,
            cross: Some(record),
        }
    }

    fn acquisition(cross: bool) -> Acquisition {
        Acquisition {
            parallel: uniform_captures(0.8),
            cross: cross.then(|| uniform_captures(0.4)),
            mask: RasterImage::filled(SIZE, SIZE, ChannelLayout::Rgb, 1.0),
            calibration: calibration(),
        }
    }

    struct Mocks {
        floats: Arc<Mutex<Vec<RasterImage>>>,
        normals: Arc<Mutex<Vec<NormalMap>>>,
        reads: Arc<Mutex<Vec<usize>>>,
    }

    fn pipeline(
        config: PipelineConfig,
        reader_fails: bool,
        writer_fails: bool,
    ) -> (ReflectancePipeline<MockReader, MockFloatWriter, MockNormalWriter>, Mocks) {
        let mocks = Mocks {
            floats: Arc::new(Mutex::new(Vec::new())),
            normals: Arc::new(Mutex::new(Vec::new())),
            reads: Arc::new(Mutex::new(Vec::new())),
        };
        let pipeline = ReflectancePipeline::with_custom(
            MockReader {
                should_fail: reader_fails,
                read_sizes: mocks.reads.clone(),
            },
            MockFloatWriter {
                should_fail: writer_fails,
                written: mocks.floats.clone(),
            },
            MockNormalWriter {
                written: mocks.normals.clone(),
            },
            config,
        );
        (pipeline, mocks)
    }

    /// Writes placeholder files for every input of the default layout.
    fn write_dataset(root: &std::path::Path, layout: &DatasetLayout, checker: &str) {
        std::fs::create_dir_all(root.join(&layout.parallel_dir)).unwrap();
        std::fs::create_dir_all(root.join(&layout.cross_dir)).unwrap();
        let mut paths = layout.parallel_capture_paths(root);
        paths.extend(layout.cross_capture_paths(root));
        paths.push(layout.parallel_ambient_path(root));
        paths.push(layout.cross_ambient_path(root));
        paths.push(layout.mask_path(root));
        for path in paths {
            std::fs::write(path, b"photo").unwrap();
        }
        std::fs::write(layout.calibration_path(root), checker).unwrap();
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::builder()
            .gamma(1.8)
            .cross_polarized(false)
            .clamp_reflection(true)
            .normal_map_format(NormalMapFormat::Tiff)
            .tiff_compression(TiffCompression::DeflateFast)
            .validate_dimensions(false)
            .build();

        assert_eq!(config.gamma, 1.8);
        assert!(!config.cross_polarized);
        assert!(config.clamp_reflection);
        assert!(config.subtract_cross_gradients);
        assert!(!config.linearize_ambient);
        assert_eq!(config.output.normal_map_format, NormalMapFormat::Tiff);
        assert_eq!(config.output.tiff_compression, TiffCompression::DeflateFast);
        assert_eq!(config.output.tiff_predictor, None);
        assert!(!config.validate_dimensions);
        assert_eq!(config.layout, DatasetLayout::default());
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.gamma, 2.2);
        assert!(config.cross_polarized);
        assert!(config.subtract_cross_gradients);
        assert!(!config.clamp_reflection);
        assert_eq!(config.output.normal_map_format, NormalMapFormat::Bmp);
    }

    #[test]
    fn test_parallel_only_maps() {
        let (pipeline, _) = pipeline(PipelineConfig::builder().cross_polarized(false).build(), false, false);

        let maps = pipeline.compute_maps(acquisition(false)).unwrap();

        assert!(maps.albedo.diffuse.is_none());
        assert_eq!(maps.albedo.specular.dimensions(), (SIZE, SIZE));
        for &value in maps.albedo.specular.data() {
            assert_relative_eq!(value, 1.0);
        }
        for &normal in maps.normals.normals.normals() {
            assert_relative_eq!(normal.x, Vec3::Z.x, epsilon = 1e-6);
            assert_relative_eq!(normal.z, Vec3::Z.z, epsilon = 1e-6);
        }
        // Every capture normalizes to one: flat 1, first moments 0, second moments 1
        let expected = 2.0f32.sqrt().sqrt() / 4.0;
        for &value in maps.roughness.data() {
            assert_relative_eq!(value, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_cross_maps_separate_albedo() {
        let (pipeline, _) = pipeline(PipelineConfig::default(), false, false);

        let maps = pipeline.compute_maps(acquisition(true)).unwrap();

        let diffuse = maps.albedo.diffuse.expect("cross run produces a diffuse map");
        for &value in diffuse.data() {
            assert_relative_eq!(value, 1.0);
        }
        // Both sets normalize to one, so nothing specular remains
        for &value in maps.albedo.specular.data() {
            assert_relative_eq!(value, 0.0);
        }
        assert_eq!(maps.normals.average, Some(Vec3::Z));
        assert!(maps.roughness.sample(0, 0, Channel::Green).is_nan());
    }

    #[test]
    fn test_cross_maps_with_parallel_gradients() {
        let config = PipelineConfig::builder().subtract_cross_gradients(false).build();
        let (pipeline, _) = pipeline(config, false, false);

        let maps = pipeline.compute_maps(acquisition(true)).unwrap();

        let expected = 2.0f32.sqrt().sqrt() / 4.0;
        assert_relative_eq!(maps.roughness.sample(1, 2, Channel::Blue), expected, epsilon = 1e-6);
    }

    fn captures_with(capture: f32, ambient: f32, transfer: Transfer) -> PolarizedCaptures {
        let photo = |value: f32| Photo {
            image: RasterImage::filled(SIZE, SIZE, ChannelLayout::Rgb, value),
            transfer,
        };
        PolarizedCaptures {
            captures: (0..7).map(|_| photo(capture)).collect(),
            ambient: photo(ambient),
        }
    }

    #[test]
    fn test_preprocess_subtracts_display_encoded_ambient() {
        let (pipeline, _) = pipeline(PipelineConfig::default(), false, false);

        let set = pipeline
            .preprocess(captures_with(0.8, 0.25, Transfer::DisplayEncoded))
            .unwrap();

        let expected = 0.8f32.powf(2.2) - 0.25;
        for capture in set.captures() {
            for &value in capture.data() {
                assert_relative_eq!(value, expected, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_preprocess_linearizes_ambient_when_asked() {
        let config = PipelineConfig::builder().linearize_ambient(true).build();
        let (pipeline, _) = pipeline(config, false, false);

        let set = pipeline
            .preprocess(captures_with(0.8, 0.25, Transfer::DisplayEncoded))
            .unwrap();

        let expected = 0.8f32.powf(2.2) - 0.25f32.powf(2.2);
        assert_relative_eq!(set.flat.sample(2, 1, Channel::Green), expected, epsilon = 1e-6);
        assert_relative_eq!(set.curvature_y.sample(0, 3, Channel::Red), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_preprocess_clamps_after_subtraction() {
        let (pipeline, _) = pipeline(PipelineConfig::default(), false, false);

        // 0.5^2.2 is below the 0.25 ambient
        let set = pipeline
            .preprocess(captures_with(0.5, 0.25, Transfer::DisplayEncoded))
            .unwrap();

        assert!(set.flat.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_preprocess_keeps_linear_photos() {
        let config = PipelineConfig::builder().linearize_ambient(true).build();
        let (pipeline, _) = pipeline(config, false, false);

        let set = pipeline
            .preprocess(captures_with(0.5, 0.25, Transfer::Linear))
            .unwrap();

        for &value in set.plus_x.data() {
            assert_relative_eq!(value, 0.25, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_cross_requires_cross_record() {
        let (pipeline, _) = pipeline(PipelineConfig::default(), false, false);
        let mut input = acquisition(true);
        input.calibration.cross = None;

        let result = pipeline.compute_maps(input);

        assert!(matches!(result, Err(ReflectanceError::CalibrationError(_))));
    }

    #[test]
    fn test_dimension_validation_failure() {
        let (pipeline, _) = pipeline(PipelineConfig::default(), false, false);
        let mut input = acquisition(true);
        input.parallel.captures[3] = uniform_photo(2, 0.8);

        let result = pipeline.compute_maps(input);

        assert!(matches!(
            result,
            Err(ReflectanceError::DimensionMismatch {
                expected: (4, 4),
                found: (2, 2)
            })
        ));
    }

    #[test]
    fn test_dimension_validation_disabled_still_rejects_mismatch() {
        let config = PipelineConfig::builder().validate_dimensions(false).build();
        let (pipeline, _) = pipeline(config, false, false);
        let mut input = acquisition(false);
        input.parallel.captures[3] = uniform_photo(2, 0.8);

        assert!(pipeline.compute_maps(input).is_err());
    }

    #[test]
    fn test_write_maps_names_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("textures");
        let (pipeline, mocks) = pipeline(PipelineConfig::default(), false, false);
        let maps = pipeline.compute_maps(acquisition(true)).unwrap();

        let written = pipeline.write_maps(&maps, &output_dir).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["diffuse.mock", "specular.mock", "roughness.mock", "normalMap.bmp"]);
        assert!(output_dir.is_dir());
        assert_eq!(mocks.floats.lock().unwrap().len(), 3);
        assert_eq!(mocks.normals.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_writer_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(PipelineConfig::default(), false, true);
        let maps = pipeline.compute_maps(acquisition(true)).unwrap();

        let result = pipeline.write_maps(&maps, dir.path());

        assert!(matches!(result, Err(ReflectanceError::EncodeError(_))));
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(PipelineConfig::default(), false, false);

        let result = pipeline.run(dir.path());

        assert!(matches!(result, Err(ReflectanceError::InputReadError(_))));
    }

    #[test]
    fn test_reader_failure_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::default();
        write_dataset(dir.path(), &layout, "0.5 0.5 0.5 0.5\n0.5 0.5 0.5 0.5\n");
        let (pipeline, _) = pipeline(PipelineConfig::default(), true, false);

        match pipeline.load_acquisition(dir.path()) {
            Err(ReflectanceError::DecodeError(msg)) => assert!(msg.contains("IMG_2855.JPG")),
            other => panic!("expected decode error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_load_acquisition_reads_every_input() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::default();
        write_dataset(dir.path(), &layout, "0.5 0.5 0.5 0.5\n0.5 0.5 0.5 0.5\n");
        let (pipeline, mocks) = pipeline(PipelineConfig::default(), false, false);

        let input = pipeline.load_acquisition(dir.path()).unwrap();

        assert_eq!(input.parallel.captures.len(), 7);
        assert_eq!(input.cross.as_ref().map(|c| c.captures.len()), Some(7));
        assert_eq!(mocks.reads.lock().unwrap().len(), 17);
        assert_eq!(input.calibration, calibration());
    }

    #[test]
    fn test_load_without_cross_record_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::default();
        write_dataset(dir.path(), &layout, "0.5 0.5 0.5 0.5\n");
        let (pipeline, _) = pipeline(PipelineConfig::default(), false, false);

        let result = pipeline.load_acquisition(dir.path());

        assert!(matches!(result, Err(ReflectanceError::CalibrationError(_))));
    }

    #[test]
    fn test_run_with_timings_records_stages() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::default();
        write_dataset(dir.path(), &layout, "0.5 0.5 0.5 0.5\n0.5 0.5 0.5 0.5\n");
        let (pipeline, mocks) = pipeline(PipelineConfig::default(), false, false);

        let timings = pipeline.run_with_timings(dir.path()).unwrap();

        for step in [
            "load_inputs",
            "preprocess",
            "calibrate",
            "separate",
            "estimate_normals",
            "align_normals",
            "estimate_roughness",
            "write_outputs",
        ] {
            assert!(timings.get_step(step).is_some(), "missing step {}", step);
        }
        assert!(dir.path().join("textures").join("normalMap.bmp").exists());
        assert_eq!(mocks.floats.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_timings_accumulate() {
        let mut timings = PipelineTimings::new();
        timings.add_step("decode", Duration::from_millis(5));
        timings.add_step("decode", Duration::from_millis(3));
        timings.add_step("write", Duration::from_millis(2));

        assert_eq!(timings.steps().len(), 3);
        assert_eq!(timings.get_step("decode"), Some(Duration::from_millis(8)));
        assert_eq!(timings.total_duration(), Duration::from_millis(10));
        assert!(timings.get_step("missing").is_none());
        assert!(timings.summary().contains("Total"));
    }

    #[test]
    fn test_set_config() {
        let (mut pipeline, _) = pipeline(PipelineConfig::default(), false, false);
        pipeline.set_config(PipelineConfig::builder().gamma(1.0).build());
        assert_eq!(pipeline.config().gamma, 1.0);
    }
}
