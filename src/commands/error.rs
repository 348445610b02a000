use crate::formats::IoError;
use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpsError>;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid command parameters: {0}")]
    InvalidParams(String),

    #[error("unsupported buffer layout: {0}")]
    UnsupportedLayout(String),

    #[error("no image is open")]
    NoImage,

    #[error("no ROI with id {0}")]
    UnknownRoi(u64),

    #[error("Selected region is empty")]
    EmptyRegion,

    #[error("core buffer error: {0}")]
    Core(#[from] CoreError),

    #[error("file error: {0}")]
    Io(#[from] IoError),
}

impl OpsError {
    /// Conditions the user can fix by changing the selection rather than
    /// real failures.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::EmptyRegion)
    }
}
