use ndarray::{Array2, ArrayD, ArrayViewD, ArrayViewMutD, Axis, Ix2, IxDyn};

use super::{AxisKind, CoreError, Metadata, PixelType, Result};

const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

#[derive(Debug, Clone)]
pub struct Dataset<T> {
    pub data: ArrayD<T>,
    pub metadata: Metadata,
}

impl<T> Dataset<T> {
    pub fn new(data: ArrayD<T>, metadata: Metadata) -> Result<Self> {
        metadata.validate_shape(data.shape())?;
        Ok(Self { data, metadata })
    }

    pub fn from_data_with_default_metadata(data: ArrayD<T>, pixel_type: PixelType) -> Result<Self> {
        let metadata = Metadata::from_shape(data.shape(), pixel_type);
        Self::new(data, metadata)
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn axis_index(&self, axis: AxisKind) -> Option<usize> {
        self.metadata.axis_index(axis)
    }

    pub fn validate(&self) -> Result<()> {
        self.metadata.validate_shape(self.data.shape())
    }

    fn axis_len(&self, axis: AxisKind) -> usize {
        self.axis_index(axis)
            .map(|index| self.data.shape()[index])
            .unwrap_or(1)
    }

    pub fn width(&self) -> usize {
        self.axis_len(AxisKind::X)
    }

    pub fn height(&self) -> usize {
        self.axis_len(AxisKind::Y)
    }

    /// Number of slices; 1 for plain 2D buffers.
    pub fn depth(&self) -> usize {
        self.axis_len(AxisKind::Z)
    }

    /// `[Y, X]` or `[Y, X, C]` view of slice `z`.
    pub fn plane(&self, z: usize) -> Result<ArrayViewD<'_, T>> {
        let depth = self.depth();
        if z >= depth {
            return Err(CoreError::SliceOutOfRange { index: z, depth });
        }
        Ok(match self.axis_index(AxisKind::Z) {
            Some(axis) => self.data.index_axis(Axis(axis), z),
            None => self.data.view(),
        })
    }

    pub fn plane_mut(&mut self, z: usize) -> Result<ArrayViewMutD<'_, T>> {
        let depth = self.depth();
        if z >= depth {
            return Err(CoreError::SliceOutOfRange { index: z, depth });
        }
        Ok(match self.axis_index(AxisKind::Z) {
            Some(axis) => self.data.index_axis_mut(Axis(axis), z),
            None => self.data.view_mut(),
        })
    }
}

impl Dataset<f64> {
    /// Finite min/max over every sample.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut iter = self.data.iter().copied().filter(|value| value.is_finite());
        let first = iter.next()?;
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
        Some((min, max))
    }

    /// Single-channel `[Y, X]` copy of slice `z`; RGB is reduced to luma.
    pub fn gray_plane(&self, z: usize) -> Result<Array2<f64>> {
        gray_from_plane(self.plane(z)?)
    }

    /// Gray value at `(row, col)` of slice `z`, `None` when out of bounds.
    pub fn sample(&self, z: usize, row: usize, col: usize) -> Option<f64> {
        let plane = self.plane(z).ok()?;
        if row >= self.height() || col >= self.width() {
            return None;
        }
        if plane.ndim() == 3 {
            Some(
                LUMA_WEIGHTS
                    .iter()
                    .enumerate()
                    .map(|(channel, weight)| plane[IxDyn(&[row, col, channel])] * weight)
                    .sum(),
            )
        } else {
            Some(plane[IxDyn(&[row, col])])
        }
    }
}

/// Converts a `[Y, X]` or `[Y, X, 3]` plane to an owned gray plane.
pub fn gray_from_plane(plane: ArrayViewD<'_, f64>) -> Result<Array2<f64>> {
    match plane.ndim() {
        2 => plane
            .to_owned()
            .into_dimensionality::<Ix2>()
            .map_err(|error| CoreError::UnsupportedLayout(error.to_string())),
        3 if plane.shape()[2] == 3 => {
            let (height, width) = (plane.shape()[0], plane.shape()[1]);
            Ok(Array2::from_shape_fn((height, width), |(row, col)| {
                LUMA_WEIGHTS
                    .iter()
                    .enumerate()
                    .map(|(channel, weight)| plane[IxDyn(&[row, col, channel])] * weight)
                    .sum()
            }))
        }
        _ => Err(CoreError::UnsupportedLayout(format!(
            "expected a [Y, X] or [Y, X, 3] plane, found {:?}",
            plane.shape()
        ))),
    }
}

pub type PixelBuffer = Dataset<f64>;
