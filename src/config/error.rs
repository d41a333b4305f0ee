use std::path::PathBuf;
use thiserror::Error;

use crate::config::parser::ParseError;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    /// Configuration path is not valid UTF-8 or cannot be expanded.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),
    /// Rule file failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Environment or CLI setting has an unusable value.
    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidSetting {
        name: String,
        value: String,
        reason: String,
    },
    /// File watcher could not be set up.
    #[error("Failed to watch config: {0}")]
    Watch(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
