use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("buffer has {data} axes but its metadata describes {metadata}")]
    RankMismatch { data: usize, metadata: usize },

    #[error("axis {axis} has {data} samples but its metadata says {metadata}")]
    AxisLengthMismatch {
        axis: usize,
        data: usize,
        metadata: usize,
    },

    #[error("axis {axis} is empty")]
    EmptyAxis { axis: usize },

    #[error("slice index {index} is out of range for depth {depth}")]
    SliceOutOfRange { index: usize, depth: usize },

    #[error("unsupported buffer layout: {0}")]
    UnsupportedLayout(String),

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
}
