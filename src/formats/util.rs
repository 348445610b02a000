use std::path::Path;

use crate::model::{Metadata, PixelType};

use super::{IoError, Result};

pub(crate) fn extension(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .ok_or_else(|| IoError::UnsupportedFormat(path.to_string_lossy().to_string()))?;
    Ok(ext)
}

pub(crate) fn metadata_for_shape(path: &Path, shape: &[usize], pixel_type: PixelType) -> Metadata {
    Metadata {
        source: Some(path.to_path_buf()),
        ..Metadata::from_shape(shape, pixel_type)
    }
}

/// Scales samples into 0..=255 using `range`, or the finite data range when
/// no fixed range is known.
pub(crate) fn to_u8_samples(values: &[f64], range: Option<(f64, f64)>) -> Vec<u8> {
    let (min, max) = range.unwrap_or_else(|| min_max(values));
    let span = max - min;
    values
        .iter()
        .map(|value| {
            let normalized = if !value.is_finite() || span.abs() < f64::EPSILON {
                0.0
            } else {
                (*value - min) / span
            };
            (normalized.clamp(0.0, 1.0) * 255.0).round() as u8
        })
        .collect()
}

pub(crate) fn min_max(values: &[f64]) -> (f64, f64) {
    let mut iter = values.iter().copied().filter(|value| value.is_finite());
    let first = iter.next().unwrap_or(0.0);
    let mut min = first;
    let mut max = first;
    for value in iter {
        if value < min {
            min = value;
        }
        if value > max {
            max = value;
        }
    }
    (min, max)
}
