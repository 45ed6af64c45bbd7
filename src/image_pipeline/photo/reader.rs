use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::photo::types::Photo;

pub trait PhotoReader {
    fn read_photo(&self, data: &[u8]) -> Result<Photo>;
}
