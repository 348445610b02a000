use std::fs::{self, File};
use std::path::{Path, PathBuf};

use ndarray::{Array, IxDyn};
use serde::Serialize;

use crate::model::{PixelBuffer, PixelType};

use super::util::{extension, metadata_for_shape};
use super::{IoError, RawImportParams, RawSampleType, RawStack, Result};

/// What the loader had to do to fit the files to the requested geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawLoadReport {
    pub files: Vec<PathBuf>,
    pub expected_bytes: u64,
    pub padded_bytes: u64,
    pub truncated_bytes: u64,
    pub warnings: Vec<String>,
}

impl RawLoadReport {
    fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.warnings.push(message);
    }
}

#[derive(Debug, Clone)]
pub struct RawLoad {
    pub buffer: PixelBuffer,
    pub report: RawLoadReport,
}

macro_rules! decode_as {
    ($ty:ty, $bytes:expr, $little:expr, $out:expr) => {{
        const WIDTH: usize = std::mem::size_of::<$ty>();
        for chunk in $bytes.chunks_exact(WIDTH) {
            let mut raw = [0u8; WIDTH];
            raw.copy_from_slice(chunk);
            let value = if $little {
                <$ty>::from_le_bytes(raw)
            } else {
                <$ty>::from_be_bytes(raw)
            };
            $out.push(value as f64);
        }
    }};
}

/// Appends the samples encoded in `bytes` to `out`.
pub(crate) fn decode_samples(
    kind: RawSampleType,
    bytes: &[u8],
    little_endian: bool,
    out: &mut Vec<f64>,
) {
    match kind {
        RawSampleType::U8 | RawSampleType::Rgb24 => {
            out.extend(bytes.iter().map(|byte| f64::from(*byte)))
        }
        RawSampleType::I8 => out.extend(bytes.iter().map(|byte| f64::from(*byte as i8))),
        RawSampleType::I16 => decode_as!(i16, bytes, little_endian, out),
        RawSampleType::U16 => decode_as!(u16, bytes, little_endian, out),
        RawSampleType::I32 => decode_as!(i32, bytes, little_endian, out),
        RawSampleType::U32 => decode_as!(u32, bytes, little_endian, out),
        RawSampleType::I64 => decode_as!(i64, bytes, little_endian, out),
        RawSampleType::U64 => decode_as!(u64, bytes, little_endian, out),
        RawSampleType::F32 => decode_as!(f32, bytes, little_endian, out),
        RawSampleType::F64 => decode_as!(f64, bytes, little_endian, out),
    }
}

/// Loads `params.num_images` images from `path` (or from every sibling file
/// with the same extension when `open_all_files` is set) into one buffer.
pub fn read_raw(path: impl AsRef<Path>, params: &RawImportParams) -> Result<RawLoad> {
    let path = path.as_ref();
    params.validate()?;
    let files = if params.open_all_files {
        sibling_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut report = RawLoadReport {
        files: files.clone(),
        ..RawLoadReport::default()
    };
    let mut samples = Vec::with_capacity(params.total_samples(files.len())?);
    for file_path in &files {
        let stack = RawStack::open(file_path, params.clone())?;
        let mut file = File::open(file_path)?;
        for index in 0..stack.depth() {
            let frame = stack.read_frame(&mut file, index)?;
            report.expected_bytes += params.frame_bytes()?;
            if frame.padded_bytes > 0 {
                report.padded_bytes += frame.padded_bytes;
                report.warn(format!(
                    "{}: image {index} is {} bytes short, padded with zeros",
                    file_path.display(),
                    frame.padded_bytes
                ));
            }
            samples.extend(frame.samples);
        }
        let trailing = stack.trailing_bytes()?;
        if trailing > 0 {
            report.truncated_bytes += trailing;
            report.warn(format!(
                "{}: ignoring {trailing} trailing bytes beyond the last image",
                file_path.display()
            ));
        }
    }

    let depth = params.num_images * files.len();
    let mut shape = Vec::with_capacity(4);
    if depth > 1 {
        shape.push(depth);
    }
    shape.extend([params.height, params.width]);
    if params.image_type.samples_per_pixel() > 1 {
        shape.push(params.image_type.samples_per_pixel());
    }

    let pixel_type: PixelType = params.image_type.pixel_type();
    let data = Array::from_shape_vec(IxDyn(&shape), samples)
        .map_err(|error| IoError::UnsupportedLayout(error.to_string()))?;
    let mut metadata = metadata_for_shape(path, &shape, pixel_type);
    metadata
        .extras
        .insert("raw_params".to_string(), serde_json::to_value(params)?);
    let buffer = PixelBuffer::new(data, metadata)?;
    log::info!(
        "loaded {} as {:?} {}",
        path.display(),
        buffer.shape(),
        params.image_type.label()
    );
    Ok(RawLoad { buffer, report })
}

fn sibling_files(path: &Path) -> Result<Vec<PathBuf>> {
    let wanted = extension(path).ok();
    let folder = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut files = fs::read_dir(folder)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|candidate| candidate.is_file())
        .filter(|candidate| extension(candidate).ok() == wanted)
        .collect::<Vec<_>>();
    files.sort();
    if files.is_empty() {
        files.push(path.to_path_buf());
    }
    Ok(files)
}
