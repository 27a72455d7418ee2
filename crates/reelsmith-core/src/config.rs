//! Application configuration model.
//!
//! Loaded from `config.toml`; every section and field is optional and falls
//! back to the defaults below.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::{AspectRatio, ModelVersion};

pub const DEFAULT_DATA_DIR: &str = "generated_videos";
pub const DEFAULT_SESSIONS_FILE: &str = "sessions.json";
pub const DEFAULT_LEGACY_SESSIONS_FILE: &str = "veo3_sessions.json";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_MAX_POLLS: u32 = 60;
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub generation: GenerationConfig,
    pub api: ApiConfig,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding artifacts and the canonical session document.
    pub data_dir: PathBuf,
    /// File name of the canonical session document inside `data_dir`.
    pub sessions_file: String,
    /// Single-file format read once when no canonical document exists.
    pub legacy_sessions_file: PathBuf,
}

impl StorageConfig {
    pub fn sessions_path(&self) -> PathBuf {
        self.data_dir.join(&self.sessions_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            sessions_file: DEFAULT_SESSIONS_FILE.to_string(),
            legacy_sessions_file: PathBuf::from(DEFAULT_LEGACY_SESSIONS_FILE),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub poll_interval_secs: u64,
    pub max_polls: u32,
    pub default_model: ModelVersion,
    pub default_aspect_ratio: AspectRatio,
}

impl GenerationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Longest time a variation may spend polling.
    pub fn timeout_ceiling(&self) -> Duration {
        self.poll_interval() * self.max_polls
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_polls: DEFAULT_MAX_POLLS,
            default_model: ModelVersion::default(),
            default_aspect_ratio: AspectRatio::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Contents of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
