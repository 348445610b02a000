use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ui::interaction::{EditorConfig, ShapeKind};

use super::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub editor: EditorConfig,
    pub default_tool: ShapeKind,
    pub playback_interval_ms: u64,
    /// Where raw import parameters are remembered between sessions.
    pub raw_params_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            default_tool: ShapeKind::Rectangle,
            playback_interval_ms: 100,
            raw_params_path: None,
        }
    }
}

impl SessionConfig {
    pub fn playback_interval(&self) -> Duration {
        Duration::from_millis(self.playback_interval_ms)
    }
}

fn is_yaml(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(extension.as_str(), "yaml" | "yml")
}

/// Reads a session config from JSON, or YAML for `.yaml`/`.yml` files.
pub fn load_config(path: impl AsRef<Path>) -> Result<SessionConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let config = if is_yaml(path) {
        serde_yaml::from_str::<SessionConfig>(&raw)
            .map_err(|error| AppError::ConfigParse(error.to_string()))?
    } else {
        serde_json::from_str::<SessionConfig>(&raw)
            .map_err(|error| AppError::ConfigParse(error.to_string()))?
    };
    if config.editor.hit_tolerance <= 0.0 || config.editor.closure_threshold <= 0.0 {
        return Err(AppError::ConfigParse(
            "editor tolerances must be positive".to_string(),
        ));
    }
    Ok(config)
}

pub fn save_config(path: impl AsRef<Path>, config: &SessionConfig) -> Result<()> {
    let path = path.as_ref();
    let serialized = if is_yaml(path) {
        serde_yaml::to_string(config).map_err(|error| AppError::ConfigParse(error.to_string()))?
    } else {
        serde_json::to_string_pretty(config)
            .map_err(|error| AppError::ConfigParse(error.to_string()))?
    };
    fs::write(path, serialized)?;
    Ok(())
}
