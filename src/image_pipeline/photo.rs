//! Decoding of input photographs into linear-ready float rasters

mod auto_reader;
pub mod debayer;
mod encoded_reader;
mod rawloader_reader;
mod reader;
pub mod types;

pub use auto_reader::AutoPhotoReader;
pub use encoded_reader::EncodedPhotoReader;
pub use rawloader_reader::RawLoaderReader;
pub use reader::PhotoReader;
pub use types::{Photo, Transfer};
