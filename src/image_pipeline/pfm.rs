//! Portable float map (PFM) codec
//!
//! Layout: a `PF` (RGB) or `Pf` (gray) line, a `<width> <height>` line, a scale
//! line whose sign gives the byte order (negative for little-endian), then raw
//! `f32` samples, bottom row first, left to right.

mod reader;
mod writer;


pub use reader::{PfmHeader, read_pfm, read_pfm_file};
pub use writer::{PfmWriter, write_pfm, write_pfm_file};
