//! Common utilities module
//!
//! This module contains the error type, the raster buffer and the sample mask
//! shared across the image pipeline.

pub mod error;
pub mod mask;
pub mod raster;

pub use error::{ReflectanceError, Result};
pub use mask::{MASK_REFERENCE_CHANNEL, MASK_THRESHOLD, Mask};
pub use raster::{Channel, ChannelLayout, RasterImage};
