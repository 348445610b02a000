use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("unsupported dataset layout for this format: {0}")]
    UnsupportedLayout(String),

    #[error("invalid raw import parameters: {0}")]
    InvalidParams(String),

    #[error("image {index} is out of range for a stack of {depth}")]
    SliceOutOfRange { index: usize, depth: usize },

    #[error("background load ended without a result")]
    LoadAborted,

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encode failure: {0}")]
    Image(#[from] image::ImageError),

    #[error("parameter serialization failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("core dataset/metadata failure: {0}")]
    Core(#[from] CoreError),
}
