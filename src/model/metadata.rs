use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{AxisKind, CoreError, PixelType, Result, default_axis_for_index};

/// One axis of a buffer and its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dim {
    pub axis: AxisKind,
    pub size: usize,
}

impl Dim {
    pub fn new(axis: AxisKind, size: usize) -> Self {
        Self { axis, size }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub dims: Vec<Dim>,
    pub pixel_type: PixelType,
    pub channel_names: Vec<String>,
    pub source: Option<PathBuf>,
    /// Loader-specific details, e.g. the raw import parameters used.
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            dims: Vec::new(),
            pixel_type: PixelType::U8,
            channel_names: Vec::new(),
            source: None,
            extras: BTreeMap::new(),
        }
    }
}

impl Metadata {
    /// Builds `[Y, X]` / `[Z, Y, X]` dims, with a trailing channel axis for
    /// packed RGB data.
    pub fn from_shape(shape: &[usize], pixel_type: PixelType) -> Self {
        let rgb = pixel_type == PixelType::Rgb24 && shape.len() >= 3;
        let spatial = shape.len() - usize::from(rgb);
        let mut dims = shape[..spatial]
            .iter()
            .enumerate()
            .map(|(index, size)| Dim::new(default_axis_for_index(spatial, index), *size))
            .collect::<Vec<_>>();
        let channel_names = if rgb {
            dims.push(Dim::new(AxisKind::Channel, shape[spatial]));
            ["R", "G", "B"].map(String::from).to_vec()
        } else {
            Vec::new()
        };
        Self {
            dims,
            pixel_type,
            channel_names,
            ..Self::default()
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|dim| dim.size).collect()
    }

    pub fn axis_index(&self, axis: AxisKind) -> Option<usize> {
        self.dims.iter().position(|dim| dim.axis == axis)
    }

    /// Checks that `shape` has one non-empty entry per dim, matching its size,
    /// and that both image axes are present.
    pub fn validate_shape(&self, shape: &[usize]) -> Result<()> {
        if self.dims.len() != shape.len() {
            return Err(CoreError::RankMismatch {
                data: shape.len(),
                metadata: self.dims.len(),
            });
        }
        if let Some(axis) = shape.iter().position(|size| *size == 0) {
            return Err(CoreError::EmptyAxis { axis });
        }
        if let Some((axis, (dim, actual))) = self
            .dims
            .iter()
            .zip(shape)
            .enumerate()
            .find(|(_, (dim, actual))| dim.size != **actual)
        {
            return Err(CoreError::AxisLengthMismatch {
                axis,
                data: *actual,
                metadata: dim.size,
            });
        }
        if self.axis_index(AxisKind::Y).is_none() || self.axis_index(AxisKind::X).is_none() {
            return Err(CoreError::InvalidMetadata(
                "buffers need both a Y and an X axis".to_string(),
            ));
        }
        Ok(())
    }
}
