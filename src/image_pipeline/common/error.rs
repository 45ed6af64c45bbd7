use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReflectanceError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Image dimensions differ: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Channel count differs: expected {expected}, found {found}")]
    ChannelMismatch { expected: usize, found: usize },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid calibration record: {0}")]
    CalibrationError(String),

    #[error("Invalid floating-point image: {0}")]
    InvalidFloatImage(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReflectanceError>;
