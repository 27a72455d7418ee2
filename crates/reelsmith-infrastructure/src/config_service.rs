//! Configuration service.
//!
//! Loads `config.toml` and `secret.json` from the reelsmith config directory
//! (or explicit paths) and caches the parsed configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use reelsmith_core::config::{AppConfig, SecretConfig};
use reelsmith_core::{ReelError, Result};

use crate::paths::ReelsmithPaths;

/// Environment variable that overrides the API key from `secret.json`.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone)]
pub struct ConfigService {
    config_file: PathBuf,
    secret_file: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    pub fn new(config_file: impl Into<PathBuf>, secret_file: impl Into<PathBuf>) -> Self {
        Self {
            config_file: config_file.into(),
            secret_file: secret_file.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses `~/.config/reelsmith/{config.toml,secret.json}`.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(ReelsmithPaths::config_file()?, ReelsmithPaths::secret_file()?))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Returns the application configuration, reading the file on first use.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn get_config(&self) -> Result<AppConfig> {
        if let Some(cached) = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(cached.clone());
        }

        let loaded = Self::read_config(&self.config_file)?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn read_config(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(path)?;
        let config = AppConfig::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Reads `secret.json`. A missing file yields an empty secret set.
    pub fn load_secrets(&self) -> Result<SecretConfig> {
        if !self.secret_file.exists() {
            return Ok(SecretConfig::default());
        }

        let content = fs::read_to_string(&self.secret_file)?;
        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Resolves the API key, preferring `env_override` over `secret.json`.
    ///
    /// # Errors
    ///
    /// Returns `ReelError::Configuration` when no non-blank key is available.
    pub fn resolve_api_key(&self, env_override: Option<String>) -> Result<String> {
        if let Some(key) = env_override.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            tracing::debug!("Using API key from {API_KEY_ENV}");
            return Ok(key);
        }

        self.load_secrets()?
            .gemini
            .map(|g| g.api_key.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ReelError::configuration(format!(
                    "API key not found. Set {API_KEY_ENV} or add gemini.api_key to {}",
                    self.secret_file.display()
                ))
            })
    }

    /// Resolves the API key using the process environment.
    pub fn api_key(&self) -> Result<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }
}
