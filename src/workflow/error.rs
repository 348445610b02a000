use crate::commands::OpsError;
use crate::formats::IoError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("replay script parse failure: {0}")]
    Parse(String),

    #[error("replay script I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("replay serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("replay YAML serialization failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("step {index} failed: {source}")]
    Command {
        index: usize,
        #[source]
        source: OpsError,
    },

    #[error("step {index} failed to load slice: {source}")]
    Slice {
        index: usize,
        #[source]
        source: IoError,
    },
}
