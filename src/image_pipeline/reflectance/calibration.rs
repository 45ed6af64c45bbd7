//! Checkerchart white balance and mask-relative range normalization.

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::image_pipeline::common::error::{ReflectanceError, Result};
use crate::image_pipeline::common::mask::Mask;
use crate::image_pipeline::common::raster::RasterImage;
use crate::image_pipeline::reflectance::gradient_set::GradientIlluminationSet;

/// Tokens per record: observed red, green, blue, then the target value.
const RECORD_TOKENS: usize = 4;

/// Chart patch intensities measured in one acquisition and the value they should have.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckerchartRecord {
    /// Observed red, green and blue intensities
    pub observed: [f32; 3],
    pub target: f32,
}

impl CheckerchartRecord {
    pub fn ratios(&self) -> CalibrationRatios {
        CalibrationRatios {
            red: self.target / self.observed[0],
            green: self.target / self.observed[1],
            blue: self.target / self.observed[2],
        }
    }
}

/// Per-channel multipliers bringing an acquisition onto the chart's reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRatios {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl CalibrationRatios {
    pub fn as_array(&self) -> [f32; 3] {
        [self.red, self.green, self.blue]
    }
}

/// Contents of the calibration file: the parallel record, then optionally the cross record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckerchartCalibration {
    pub parallel: CheckerchartRecord,
    pub cross: Option<CheckerchartRecord>,
}

impl CheckerchartCalibration {
    pub fn parse(text: &str) -> Result<Self> {
        let values = text
            .split_whitespace()
            .map(|token| {
                token.parse::<f32>().map_err(|e| {
                    ReflectanceError::CalibrationError(format!("'{}': {}", token, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut records = values.chunks(RECORD_TOKENS).map(|chunk| {
            if chunk.len() != RECORD_TOKENS {
                return Err(ReflectanceError::CalibrationError(format!(
                    "incomplete record, expected {} values, got {}",
                    RECORD_TOKENS,
                    chunk.len()
                )));
            }
            Ok(CheckerchartRecord {
                observed: [chunk[0], chunk[1], chunk[2]],
                target: chunk[3],
            })
        });

        let parallel = records
            .next()
            .ok_or_else(|| ReflectanceError::CalibrationError("file holds no record".into()))??;
        let cross = records.next().transpose()?;

        Ok(Self { parallel, cross })
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReflectanceError::InputReadError(format!("{}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    /// Cross ratios, failing when the file carries no cross record.
    pub fn cross_record(&self) -> Result<CheckerchartRecord> {
        self.cross.ok_or_else(|| {
            ReflectanceError::CalibrationError(
                "cross-polarized data requires a second record".into(),
            )
        })
    }
}

/// Multiplies every capture of the set by the per-channel ratios.
pub fn apply_calibration(set: GradientIlluminationSet, ratios: &CalibrationRatios) -> GradientIlluminationSet {
    let factors = ratios.as_array();
    set.map(|mut capture| {
        capture.map_pixels_in_place(|pixel| {
            for (value, factor) in pixel.iter_mut().zip(factors) {
                *value *= factor;
            }
        });
        capture
    })
}

/// Largest single-channel value among pixels inside the mask.
pub fn masked_max(image: &RasterImage, mask: &Mask) -> Result<f32> {
    mask.ensure_covers(image)?;
    Ok(image
        .data()
        .par_chunks(image.channels())
        .zip(mask.flags().par_iter())
        .filter(|(_, inside)| **inside)
        .map(|(pixel, _)| pixel.iter().copied().fold(0.0f32, f32::max))
        .reduce(|| 0.0, f32::max))
}

/// Divides every channel of every pixel by the masked maximum.
///
/// One divisor is shared by all channels so colour ratios survive. A masked
/// maximum that is not positive leaves the image untouched.
pub fn scale_to_unit_range(image: &RasterImage, mask: &Mask) -> Result<RasterImage> {
    let maximum = masked_max(image, mask)?;
    if maximum > 0.0 {
        Ok(image.map(|v| v / maximum))
    } else {
        debug!("Masked maximum is {}, skipping range normalization", maximum);
        Ok(image.clone())
    }
}

/// White balances a set with the chart ratios, then normalizes each capture to the mask.
pub fn calibrate_set(
    set: GradientIlluminationSet,
    record: &CheckerchartRecord,
    mask: &Mask,
) -> Result<GradientIlluminationSet> {
    let ratios = record.ratios();
    info!(
        red = ratios.red,
        green = ratios.green,
        blue = ratios.blue,
        "Checkerchart ratios"
    );
    apply_calibration(set, &ratios).try_map(|capture| scale_to_unit_range(&capture, mask))
}
