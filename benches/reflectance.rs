use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use reflectance_maps_rs::image_pipeline::{
    Acquisition, NormalMapFormat, OutputConfig, PipelineConfig, RasterImage, ReflectancePipeline,
    StandardNormalMapWriter, NormalMapWriter, TiffCompression,
    common::ChannelLayout,
    conversions::PolarizedCaptures,
    photo::{Photo, Transfer},
    reflectance::{CheckerchartCalibration, CheckerchartRecord},
};
use std::io::Cursor;

fn gradient_photo(width: usize, height: usize, slot: usize) -> Photo {
    let image = RasterImage::from_fn_rgb(width, height, |x, y| {
        let u = x as f32 / width as f32;
        let v = y as f32 / height as f32;
        let value = match slot {
            1 => 0.5 + 0.4 * u,
            2 => 0.9 - 0.4 * u,
            3 => 0.5 + 0.4 * v,
            4 => 0.9 - 0.4 * v,
            5 | 6 => 0.6,
            _ => 0.9,
        };
        [value, value, value]
    });
    Photo {
        image,
        transfer: Transfer::DisplayEncoded,
    }
}

fn synthetic_acquisition(width: usize, height: usize) -> Acquisition {
    let captures = |scale: f32| PolarizedCaptures {
        captures: (0..7)
            .map(|slot| {
                let mut photo = gradient_photo(width, height, slot);
                photo.image = photo.image.scale(scale);
                photo
            })
            .collect(),
        ambient: Photo {
            image: RasterImage::filled(width, height, ChannelLayout::Rgb, 0.02),
            transfer: Transfer::DisplayEncoded,
        },
    };
    let record = CheckerchartRecord {
        observed: [0.45, 0.5, 0.55],
        target: 0.5,
    };

    Acquisition {
        parallel: captures(1.0),
        cross: Some(captures(0.4)),
        mask: RasterImage::from_fn_rgb(width, height, |x, y| {
            let inside = x > width / 4 && x < 3 * width / 4 && y > height / 4 && y < 3 * height / 4;
            if inside { [1.0; 3] } else { [0.0; 3] }
        }),
        calibration: CheckerchartCalibration {
            parallel: record,
            cross: Some(record),
        },
    }
}

fn benchmark_compute_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_maps_by_size");

    let sizes = vec![
        (100, 100, "100x100"),
        (500, 500, "500x500"),
        (1000, 1000, "1000x1000"),
    ];

    for (width, height, label) in sizes {
        let acquisition = synthetic_acquisition(width, height);

        group.bench_with_input(BenchmarkId::from_parameter(label), &acquisition, |b, acquisition| {
            let pipeline = ReflectancePipeline::new(PipelineConfig::default());

            b.iter(|| {
                let _ = pipeline.compute_maps(black_box(acquisition.clone()));
            });
        });
    }

    group.finish();
}

fn benchmark_gradient_source(c: &mut Criterion) {
    let mut group = c.benchmark_group("gradient_source");
    let acquisition = synthetic_acquisition(500, 500);

    for (subtract, label) in [(true, "parallel_minus_cross"), (false, "parallel_only")] {
        group.bench_function(label, |b| {
            let config = PipelineConfig::builder()
                .subtract_cross_gradients(subtract)
                .build();
            let pipeline = ReflectancePipeline::new(config);

            b.iter(|| {
                let _ = pipeline.compute_maps(black_box(acquisition.clone()));
            });
        });
    }

    group.finish();
}

fn benchmark_normal_map_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("normal_map_encoding");
    let pipeline = ReflectancePipeline::new(PipelineConfig::default());
    let maps = match pipeline.compute_maps(synthetic_acquisition(500, 500)) {
        Ok(maps) => maps,
        Err(e) => panic!("synthetic acquisition failed: {}", e),
    };

    let formats = vec![
        (NormalMapFormat::Bmp, TiffCompression::None, "bmp"),
        (NormalMapFormat::Tiff, TiffCompression::None, "tiff_none"),
        (NormalMapFormat::Tiff, TiffCompression::Lzw, "tiff_lzw"),
        (NormalMapFormat::Tiff, TiffCompression::DeflateFast, "tiff_deflate_fast"),
    ];

    for (format, compression, label) in formats {
        let config = OutputConfig {
            normal_map_format: format,
            tiff_compression: compression,
            tiff_predictor: None,
        };
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = StandardNormalMapWriter.write_normal_map(black_box(&maps.normals.normals), &mut output, &config);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compute_by_size,
    benchmark_gradient_source,
    benchmark_normal_map_encoding
);
criterion_main!(benches);
