use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// User settings, stored as JSON.
///
/// Default location:
/// - Linux: ~/.config/pic-tagger/config.json
/// - macOS: ~/Library/Application Support/pic-tagger/config.json
/// - Windows: %APPDATA%\pic-tagger\config.json
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// ExifTool command prefix, e.g. `["perl", "C:\\exiftool\\exiftool.pl"]`
    pub exiftool: Vec<String>,
    /// Largest preview width in pixels
    pub preview_max_width: u32,
    /// Largest preview height in pixels
    pub preview_max_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exiftool: vec!["exiftool".to_string()],
            preview_max_width: 1280,
            preview_max_height: 720,
        }
    }
}

impl Config {
    /// Where the config lives unless `--config` says otherwise
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pic-tagger").join("config.json"))
    }

    /// Load from `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.exiftool.is_empty() {
            return Err(ConfigError::EmptyCommand(path.to_path_buf()));
        }

        Ok(config)
    }

    /// Load the config, falling back to the defaults (with a warning) on error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Self::default(),
        };

        match Self::load(&path) {
            Ok(config) => {
                tracing::debug!("Config loaded from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }
}
