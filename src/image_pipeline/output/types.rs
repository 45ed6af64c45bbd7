//! Output configuration types

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level (good speed/size balance)
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// File format of the 8-bit normal map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalMapFormat {
    Bmp,
    Tiff,
}

impl NormalMapFormat {
    pub fn extension(self) -> &'static str {
        match self {
            NormalMapFormat::Bmp => "bmp",
            NormalMapFormat::Tiff => "tiff",
        }
    }
}

/// How result maps are encoded
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub normal_map_format: NormalMapFormat,
    /// Compression used when the normal map is written as TIFF
    pub tiff_compression: TiffCompression,
    /// Predictor value for TIFF compression (2 for horizontal differencing)
    pub tiff_predictor: Option<u16>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            normal_map_format: NormalMapFormat::Bmp,
            tiff_compression: TiffCompression::None,
            tiff_predictor: None,
        }
    }
}
