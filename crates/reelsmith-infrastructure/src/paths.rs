//! Path management for reelsmith configuration files.
//!
//! ```text
//! ~/.config/reelsmith/         # Config directory (platform specific)
//! ├── config.toml              # Application configuration
//! └── secret.json              # API keys
//! ```
//!
//! Session data and artifacts live under `[storage].data_dir`, which is
//! relative to the working directory unless configured otherwise.

use std::path::PathBuf;

const APP_DIR_NAME: &str = "reelsmith";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot determine the configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for reelsmith_core::ReelError {
    fn from(e: PathError) -> Self {
        reelsmith_core::ReelError::configuration(e.to_string())
    }
}

pub struct ReelsmithPaths;

impl ReelsmithPaths {
    /// Returns the reelsmith configuration directory (e.g. `~/.config/reelsmith/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// Keep this file private (mode 600); it holds the API key in plain text.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}
