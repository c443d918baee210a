/// Error types shared across the application
///
/// Async results that travel inside `Message` are flattened to `String`
/// (messages must be `Clone`), everything else propagates these enums.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from scanning the image directory
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("The directory '{0}' does not exist")]
    NotFound(PathBuf),
    #[error("The path '{0}' is not a directory")]
    NotADirectory(PathBuf),
    #[error("Permission denied for accessing the directory '{0}'")]
    PermissionDenied(PathBuf),
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No .jpg, .jpeg or .png files found in '{0}'")]
    NoImages(PathBuf),
}

/// Errors from talking to ExifTool
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("ExifTool not found ('{0}'). Please install exiftool or set it in the config.")]
    ToolNotFound(String),
    #[error("ExifTool failed with exit code {exit_code:?}: {stderr}")]
    ToolFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("ExifTool I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unexpected ExifTool output: {0}")]
    InvalidOutput(String),
    #[error("Tag {0:?} cannot be written (line breaks are not allowed)")]
    InvalidTag(String),
}

/// Errors from loading the config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Config '{0}' has an empty exiftool command")]
    EmptyCommand(PathBuf),
}
