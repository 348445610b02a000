use std::path::Path;

use crate::formats::{
    RawImportParams, RawLoad, load_params, read_image, read_raw, save_params, save_plane_png,
};
use crate::model::PixelBuffer;

use super::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct IoService;

impl IoService {
    pub fn read_image(&self, path: impl AsRef<Path>) -> Result<PixelBuffer> {
        Ok(read_image(path)?)
    }

    pub fn read_raw(&self, path: impl AsRef<Path>, params: &RawImportParams) -> Result<RawLoad> {
        Ok(read_raw(path, params)?)
    }

    pub fn load_params(&self, path: impl AsRef<Path>) -> Result<RawImportParams> {
        Ok(load_params(path)?)
    }

    pub fn save_params(&self, path: impl AsRef<Path>, params: &RawImportParams) -> Result<()> {
        save_params(path, params)?;
        Ok(())
    }

    /// Writes slice `z` of `buffer` as an 8-bit PNG. Integer buffers keep
    /// their full type range; float buffers are stretched to their own range.
    pub fn export_plane(
        &self,
        path: impl AsRef<Path>,
        buffer: &PixelBuffer,
        z: usize,
    ) -> Result<()> {
        let plane = buffer.gray_plane(z)?;
        let range = buffer.metadata.pixel_type.value_range();
        save_plane_png(path, &plane, range)?;
        Ok(())
    }
}
