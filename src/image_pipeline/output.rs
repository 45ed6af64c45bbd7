//! Result map writing module
//!
//! Writers for the floating-point albedo/roughness maps and the 8-bit normal map.

mod standard_normal_map_writer;
pub mod types;
mod writer;

pub use standard_normal_map_writer::StandardNormalMapWriter;
pub use types::{NormalMapFormat, OutputConfig, TiffCompression};
pub use writer::{FloatImageWriter, NormalMapWriter};
