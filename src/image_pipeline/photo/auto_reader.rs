use image::ImageFormat;
use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::photo::encoded_reader::EncodedPhotoReader;
use crate::image_pipeline::photo::rawloader_reader::RawLoaderReader;
use crate::image_pipeline::photo::reader::PhotoReader;
use crate::image_pipeline::photo::types::Photo;

/// Picks a decoder from the file's signature.
///
/// Most camera RAW formats are TIFF containers, so TIFF data (and data with an
/// unknown signature) goes to the RAW decoder first and falls back to the
/// plain image decoder when that fails.
pub struct AutoPhotoReader {
    encoded: EncodedPhotoReader,
    raw: RawLoaderReader,
}

impl AutoPhotoReader {
    pub fn new() -> Self {
        Self {
            encoded: EncodedPhotoReader,
            raw: RawLoaderReader,
        }
    }
}

impl Default for AutoPhotoReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoReader for AutoPhotoReader {
    fn read_photo(&self, data: &[u8]) -> Result<Photo> {
        match image::guess_format(data) {
            Ok(ImageFormat::Tiff) | Err(_) => match self.raw.read_photo(data) {
                Ok(photo) => Ok(photo),
                Err(raw_err) => {
                    debug!("RAW decoding failed ({}), trying image decoders", raw_err);
                    self.encoded.read_photo(data)
                }
            },
            Ok(format) => {
                debug!("Detected {:?} photograph", format);
                self.encoded.read_photo(data)
            }
        }
    }
}
