use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use ndarray::{Array, ArrayD, IxDyn};

use crate::model::PixelBuffer;

use super::raw::decode_samples;
use super::util::metadata_for_shape;
use super::{IoError, RawImportParams, Result};

/// Outcome of reading one image from a raw file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FrameRead {
    pub(crate) samples: Vec<f64>,
    /// Bytes appended as zeros because the file ended early.
    pub(crate) padded_bytes: u64,
}

/// Raw image stack that decodes images on demand instead of loading the whole
/// file.
#[derive(Debug, Clone)]
pub struct RawStack {
    path: PathBuf,
    params: RawImportParams,
    file_len: u64,
}

impl RawStack {
    pub fn open(path: impl AsRef<Path>, params: RawImportParams) -> Result<Self> {
        params.validate()?;
        let path = path.as_ref().to_path_buf();
        let file_len = std::fs::metadata(&path)?.len();
        Ok(Self {
            path,
            params,
            file_len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn params(&self) -> &RawImportParams {
        &self.params
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    pub fn depth(&self) -> usize {
        self.params.num_images
    }

    /// Image shape: `[Y, X]`, or `[Y, X, 3]` for packed RGB.
    pub fn frame_shape(&self) -> Vec<usize> {
        let mut shape = vec![self.params.height, self.params.width];
        if self.params.image_type.samples_per_pixel() > 1 {
            shape.push(self.params.image_type.samples_per_pixel());
        }
        shape
    }

    /// Bytes after the last image that the layout does not cover.
    pub fn trailing_bytes(&self) -> Result<u64> {
        let end = self.params.frame_offset(self.depth())? - self.params.gap;
        Ok(self.file_len.saturating_sub(end))
    }

    pub fn read_slice(&self, index: usize) -> Result<ArrayD<f64>> {
        let mut file = File::open(&self.path)?;
        let frame = self.read_frame(&mut file, index)?;
        if frame.padded_bytes > 0 {
            log::warn!(
                "{}: image {index} is {} bytes short, padded with zeros",
                self.path.display(),
                frame.padded_bytes
            );
        }
        Array::from_shape_vec(IxDyn(&self.frame_shape()), frame.samples)
            .map_err(|error| IoError::UnsupportedLayout(error.to_string()))
    }

    /// One image as a standalone 2D buffer.
    pub fn read_slice_buffer(&self, index: usize) -> Result<PixelBuffer> {
        let data = self.read_slice(index)?;
        let metadata = metadata_for_shape(
            &self.path,
            data.shape(),
            self.params.image_type.pixel_type(),
        );
        Ok(PixelBuffer::new(data, metadata)?)
    }

    pub(crate) fn read_frame(&self, file: &mut File, index: usize) -> Result<FrameRead> {
        if index >= self.depth() {
            return Err(IoError::SliceOutOfRange {
                index,
                depth: self.depth(),
            });
        }
        let expected = self.params.frame_bytes()?;
        let start = self.params.frame_offset(index)?;
        let mut bytes = Vec::with_capacity(expected as usize);
        if start < self.file_len {
            file.seek(SeekFrom::Start(start))?;
            file.by_ref().take(expected).read_to_end(&mut bytes)?;
        }
        let padded_bytes = expected - bytes.len() as u64;
        bytes.resize(expected as usize, 0);

        let mut samples = Vec::with_capacity(self.params.frame_samples());
        decode_samples(
            self.params.image_type,
            &bytes,
            self.params.little_endian,
            &mut samples,
        );
        if self.params.white_is_zero {
            invert_unsigned(&self.params, &mut samples);
        }
        Ok(FrameRead {
            samples,
            padded_bytes,
        })
    }
}

fn invert_unsigned(params: &RawImportParams, samples: &mut [f64]) {
    let pixel_type = params.image_type.pixel_type();
    match pixel_type.value_range() {
        Some((_, max)) if pixel_type.is_unsigned_integer() => {
            samples.iter_mut().for_each(|value| *value = max - *value);
        }
        _ => log::debug!(
            "white-is-zero ignored for {} samples",
            params.image_type.label()
        ),
    }
}
