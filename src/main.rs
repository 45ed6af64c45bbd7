use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use reflectance_maps_rs::image_pipeline::{
    DatasetLayout, NormalMapFormat, PipelineConfig, ReflectancePipeline, TiffCompression,
};
use reflectance_maps_rs::logger;

use tracing::info;

#[derive(Parser)]
#[command(name = "reflectance-maps")]
#[command(version, about = "Albedo, normal and roughness maps from gradient illumination photographs", long_about = None)]
struct Cli {
    /// Acquisition root holding the parallel/cross folders, mask and checker file
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Only parallel-polarized photographs were captured
    #[arg(long)]
    no_cross: bool,

    /// Gamma removed from display-encoded photographs
    #[arg(long, value_name = "FLOAT", default_value = "2.2")]
    gamma: f32,

    /// Estimate normals and roughness from parallel gradients even when cross data exists
    #[arg(long)]
    parallel_only_gradients: bool,

    /// Clamp the reflection vector into the unit disc instead of producing NaN normals
    #[arg(long)]
    clamp_reflection: bool,

    /// Remove gamma from the ambient photographs too
    #[arg(long)]
    linearize_ambient: bool,

    /// Normal map file format
    #[arg(long, value_enum, default_value_t = NormalFormatArg::Bmp)]
    normal_format: NormalFormatArg,

    /// Compression of TIFF normal maps
    #[arg(long, value_enum, default_value_t = CompressionArg::None)]
    tiff_compression: CompressionArg,

    /// Extension of the input photographs
    #[arg(long, value_name = "EXT", default_value = "JPG")]
    extension: String,

    /// Number of the first parallel-polarized capture
    #[arg(long, value_name = "N", default_value_t = 2855)]
    parallel_start: u32,

    /// Number of the first cross-polarized capture
    #[arg(long, value_name = "N", default_value_t = 2869)]
    cross_start: u32,

    /// Print per-stage timings
    #[arg(long)]
    timings: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NormalFormatArg {
    Bmp,
    Tiff,
}

impl From<NormalFormatArg> for NormalMapFormat {
    fn from(value: NormalFormatArg) -> Self {
        match value {
            NormalFormatArg::Bmp => NormalMapFormat::Bmp,
            NormalFormatArg::Tiff => NormalMapFormat::Tiff,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompressionArg {
    None,
    Lzw,
    DeflateFast,
    DeflateBalanced,
    DeflateBest,
}

impl From<CompressionArg> for TiffCompression {
    fn from(value: CompressionArg) -> Self {
        match value {
            CompressionArg::None => TiffCompression::None,
            CompressionArg::Lzw => TiffCompression::Lzw,
            CompressionArg::DeflateFast => TiffCompression::DeflateFast,
            CompressionArg::DeflateBalanced => TiffCompression::DeflateBalanced,
            CompressionArg::DeflateBest => TiffCompression::DeflateBest,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_with_default(match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    });

    info!("Starting reflectance-maps...");

    let layout = DatasetLayout::default()
        .with_extension(cli.extension.as_str())
        .with_parallel_start(cli.parallel_start)
        .with_cross_start(cli.cross_start);

    let config = PipelineConfig::builder()
        .gamma(cli.gamma)
        .cross_polarized(!cli.no_cross)
        .subtract_cross_gradients(!cli.parallel_only_gradients)
        .clamp_reflection(cli.clamp_reflection)
        .linearize_ambient(cli.linearize_ambient)
        .normal_map_format(cli.normal_format.into())
        .tiff_compression(cli.tiff_compression.into())
        .layout(layout)
        .build();
    let pipeline = ReflectancePipeline::new(config);

    info!("Gamma: {}", pipeline.config().gamma);
    info!(
        "Cross-polarized data: {}",
        if pipeline.config().cross_polarized {
            "enabled"
        } else {
            "disabled"
        }
    );

    if cli.timings {
        let timings = pipeline
            .run_with_timings(&cli.root)
            .with_context(|| format!("processing {}", cli.root.display()))?;
        timings.print_summary();
    } else {
        let written = pipeline
            .run(&cli.root)
            .with_context(|| format!("processing {}", cli.root.display()))?;
        for path in written {
            info!("Wrote {}", path.display());
        }
    }

    Ok(())
}
