use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::PixelType;

use super::{IoError, Result};

/// Sample layouts accepted by the raw importer, serialized with the labels
/// shown in the import dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RawSampleType {
    #[default]
    #[serde(rename = "8-bit")]
    U8,
    #[serde(rename = "8-bit Signed")]
    I8,
    #[serde(rename = "16-bit Signed")]
    I16,
    #[serde(rename = "16-bit Unsigned")]
    U16,
    #[serde(rename = "32-bit Signed")]
    I32,
    #[serde(rename = "32-bit Unsigned")]
    U32,
    #[serde(rename = "64-bit Signed")]
    I64,
    #[serde(rename = "64-bit Unsigned")]
    U64,
    #[serde(rename = "32-bit Real")]
    F32,
    #[serde(rename = "64-bit Real")]
    F64,
    #[serde(rename = "24-bit RGB")]
    Rgb24,
}

impl RawSampleType {
    pub const ALL: [Self; 11] = [
        Self::U8,
        Self::I8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Rgb24,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::U8 => "8-bit",
            Self::I8 => "8-bit Signed",
            Self::I16 => "16-bit Signed",
            Self::U16 => "16-bit Unsigned",
            Self::I32 => "32-bit Signed",
            Self::U32 => "32-bit Unsigned",
            Self::I64 => "64-bit Signed",
            Self::U64 => "64-bit Unsigned",
            Self::F32 => "32-bit Real",
            Self::F64 => "64-bit Real",
            Self::Rgb24 => "24-bit RGB",
        }
    }

    /// Bytes of a single channel sample.
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 | Self::I8 | Self::Rgb24 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    pub const fn samples_per_pixel(self) -> usize {
        match self {
            Self::Rgb24 => 3,
            _ => 1,
        }
    }

    pub const fn pixel_type(self) -> PixelType {
        match self {
            Self::U8 => PixelType::U8,
            Self::I8 => PixelType::I8,
            Self::I16 => PixelType::I16,
            Self::U16 => PixelType::U16,
            Self::I32 => PixelType::I32,
            Self::U32 => PixelType::U32,
            Self::I64 => PixelType::I64,
            Self::U64 => PixelType::U64,
            Self::F32 => PixelType::F32,
            Self::F64 => PixelType::F64,
            Self::Rgb24 => PixelType::Rgb24,
        }
    }
}

impl FromStr for RawSampleType {
    type Err = IoError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| IoError::InvalidParams(format!("unknown image type `{trimmed}`")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawImportParams {
    pub image_type: RawSampleType,
    pub width: usize,
    pub height: usize,
    /// Byte offset of the first image.
    pub offset: u64,
    pub num_images: usize,
    /// Bytes skipped between consecutive images.
    pub gap: u64,
    pub white_is_zero: bool,
    pub little_endian: bool,
    pub open_all_files: bool,
    pub use_virtual_stack: bool,
}

impl Default for RawImportParams {
    fn default() -> Self {
        Self {
            image_type: RawSampleType::U8,
            width: 720,
            height: 576,
            offset: 0,
            num_images: 1,
            gap: 0,
            white_is_zero: false,
            little_endian: false,
            open_all_files: false,
            use_virtual_stack: false,
        }
    }
}

impl RawImportParams {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(IoError::InvalidParams(format!(
                "width and height must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.num_images == 0 {
            return Err(IoError::InvalidParams(
                "number of images must be at least 1".to_string(),
            ));
        }
        self.frame_offset(self.num_images)?;
        Ok(())
    }

    /// Samples in one decoded image, channels included.
    pub fn frame_samples(&self) -> usize {
        self.width * self.height * self.image_type.samples_per_pixel()
    }

    pub fn frame_bytes(&self) -> Result<u64> {
        self.width
            .checked_mul(self.height)
            .and_then(|pixels| pixels.checked_mul(self.image_type.samples_per_pixel()))
            .and_then(|samples| samples.checked_mul(self.image_type.bytes_per_sample()))
            .map(|bytes| bytes as u64)
            .ok_or_else(|| IoError::InvalidParams("image size overflows".to_string()))
    }

    /// Byte offset of image `index` within a file.
    pub fn frame_offset(&self, index: usize) -> Result<u64> {
        self.frame_bytes()?
            .checked_add(self.gap)
            .and_then(|stride| stride.checked_mul(index as u64))
            .and_then(|span| span.checked_add(self.offset))
            .ok_or_else(|| {
                IoError::InvalidParams(format!(
                    "offset of image {index} overflows (offset {}, gap {})",
                    self.offset, self.gap
                ))
            })
    }

    /// Samples across `files` files of `num_images` images each.
    pub fn total_samples(&self, files: usize) -> Result<usize> {
        self.frame_samples()
            .checked_mul(self.num_images)
            .and_then(|samples| samples.checked_mul(files))
            .ok_or_else(|| IoError::InvalidParams("stack size overflows".to_string()))
    }
}

/// Import dialog fields as typed by the user, before numeric validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawImportForm {
    pub image_type: String,
    pub width: String,
    pub height: String,
    pub offset: String,
    pub num_images: String,
    pub gap: String,
    pub white_is_zero: bool,
    pub little_endian: bool,
    pub open_all_files: bool,
    pub use_virtual_stack: bool,
}

impl Default for RawImportForm {
    fn default() -> Self {
        let defaults = RawImportParams::default();
        Self {
            image_type: defaults.image_type.label().to_string(),
            width: defaults.width.to_string(),
            height: defaults.height.to_string(),
            offset: defaults.offset.to_string(),
            num_images: defaults.num_images.to_string(),
            gap: defaults.gap.to_string(),
            white_is_zero: defaults.white_is_zero,
            little_endian: defaults.little_endian,
            open_all_files: defaults.open_all_files,
            use_virtual_stack: defaults.use_virtual_stack,
        }
    }
}

impl RawImportForm {
    pub fn parse(&self) -> Result<RawImportParams> {
        let params = RawImportParams {
            image_type: self.image_type.parse()?,
            width: parse_field("width", &self.width)?,
            height: parse_field("height", &self.height)?,
            offset: parse_field("offset", &self.offset)?,
            num_images: parse_field("number of images", &self.num_images)?,
            gap: parse_field("gap", &self.gap)?,
            white_is_zero: self.white_is_zero,
            little_endian: self.little_endian,
            open_all_files: self.open_all_files,
            use_virtual_stack: self.use_virtual_stack,
        };
        params.validate()?;
        Ok(params)
    }
}

fn parse_field<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        IoError::InvalidParams(format!("{name} must be a whole number, got `{}`", raw.trim()))
    })
}

pub fn load_params(path: impl AsRef<Path>) -> Result<RawImportParams> {
    let raw = fs::read_to_string(path)?;
    let params = serde_json::from_str::<RawImportParams>(&raw)?;
    Ok(params)
}

pub fn save_params(path: impl AsRef<Path>, params: &RawImportParams) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(params)?)?;
    Ok(())
}
