//! Wiring of the process-wide [`OrchestratorState`] from configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use reelsmith_application::{GenerationJobConfig, OrchestratorState};
use reelsmith_core::config::AppConfig;
use reelsmith_infrastructure::{ConfigService, FsArtifactStore, JsonSessionStore};
use reelsmith_interaction::VeoApiClient;

pub struct AppContext {
    pub state: OrchestratorState,
    pub config: AppConfig,
    /// Set when the session document could not be read at startup.
    restore_error: Option<String>,
}

impl AppContext {
    pub fn new(state: OrchestratorState, config: AppConfig) -> Self {
        Self {
            state,
            config,
            restore_error: None,
        }
    }

    /// Reads configuration, builds the stores and restores sessions.
    ///
    /// A missing API key is not fatal here: listing and editing sessions
    /// work without one, and `generate` reports the configuration error.
    pub async fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let service = match config_path {
            Some(path) => {
                let secret = path.with_file_name("secret.json");
                ConfigService::new(path, secret)
            }
            None => ConfigService::default_location()?,
        };
        let config = service
            .get_config()
            .with_context(|| format!("failed to read {}", service.config_file().display()))?;

        let store = Arc::new(JsonSessionStore::from_config(&config.storage));
        let artifacts = Arc::new(FsArtifactStore::new(&config.storage.data_dir));
        let mut state = OrchestratorState::new(
            store,
            artifacts,
            GenerationJobConfig::from(&config.generation),
        );

        match service
            .api_key()
            .and_then(|key| VeoApiClient::from_config(key, &config.api))
        {
            Ok(client) => state = state.with_client(Arc::new(client)),
            Err(error) => tracing::warn!(%error, "Video generation disabled"),
        }

        let restore_error = state.restore().await.err().map(|e| e.to_string());

        Ok(Self {
            restore_error,
            ..Self::new(state, config)
        })
    }

    /// Fails if saving now would overwrite a session file that failed to load.
    pub fn ensure_writable(&self) -> Result<()> {
        if let Some(error) = &self.restore_error {
            bail!(
                "refusing to modify sessions: the session file could not be read ({error}). \
                 Fix or move {} and try again",
                self.config.storage.sessions_path().display()
            );
        }
        Ok(())
    }
}
