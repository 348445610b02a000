use crate::commands::OpsError;
use crate::formats::IoError;
use crate::model::CoreError;
use crate::workflow::PipelineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("buffer error: {0}")]
    Buffer(#[from] CoreError),

    #[error("I/O service error: {0}")]
    Io(#[from] IoError),

    #[error("command service error: {0}")]
    Ops(#[from] OpsError),

    #[error("workflow service error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("config file error: {0}")]
    ConfigFile(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(String),
}
