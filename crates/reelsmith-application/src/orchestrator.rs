//! Process-wide orchestrator state.
//!
//! Everything a front end needs is reachable from one [`OrchestratorState`]
//! value that the process owns and passes around explicitly.

use std::sync::Arc;

use reelsmith_core::artifact::ArtifactStore;
use reelsmith_core::generation::{ProgressEvent, RemoteGenerationClient};
use reelsmith_core::session::{Generation, SessionStore};
use reelsmith_core::settings::GenerationSettings;
use reelsmith_core::{ReelError, Result};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::generation_job::{GenerationJob, GenerationJobConfig};
use crate::session_manager::SessionManager;

/// Per-call options for [`OrchestratorState::generate`].
#[derive(Default)]
pub struct GenerateOptions {
    pub progress: Option<UnboundedSender<ProgressEvent>>,
    pub cancellation: Option<CancellationToken>,
}

pub struct OrchestratorState {
    sessions: SessionManager,
    artifacts: Arc<dyn ArtifactStore>,
    /// Absent when no credential is configured.
    client: Option<Arc<dyn RemoteGenerationClient>>,
    job_config: GenerationJobConfig,
}

impl OrchestratorState {
    pub fn new(
        store: Arc<dyn SessionStore>,
        artifacts: Arc<dyn ArtifactStore>,
        job_config: GenerationJobConfig,
    ) -> Self {
        Self {
            sessions: SessionManager::new(store, artifacts.clone()),
            artifacts,
            client: None,
            job_config,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn RemoteGenerationClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Loads persisted sessions; see [`SessionManager::restore`].
    pub async fn restore(&self) -> Result<usize> {
        self.sessions.restore().await
    }

    /// Creates a session, makes it active and persists.
    pub async fn new_session(&self, name_hint: Option<&str>) -> Result<String> {
        let id = self.sessions.create_session(name_hint).await;
        self.sessions.select_session(&id).await?;
        self.sessions.persist().await?;
        Ok(id)
    }

    /// Cascade-deletes a session and persists. Returns removed artifact count.
    pub async fn delete_session(&self, session_id: &str) -> Result<usize> {
        let removed = self.sessions.delete_session(session_id).await;
        self.sessions.persist().await?;
        Ok(removed)
    }

    pub async fn rename_session(&self, session_id: &str, name: &str) -> Result<()> {
        self.sessions.rename_session(session_id, name).await?;
        self.sessions.persist().await
    }

    /// Builds a job against the configured client.
    ///
    /// # Errors
    ///
    /// `ReelError::Configuration` if no client is configured.
    pub fn job(&self) -> Result<GenerationJob> {
        let client = self.client.clone().ok_or_else(|| {
            ReelError::configuration("No API key configured; video generation is unavailable")
        })?;
        Ok(GenerationJob::new(client, self.artifacts.clone(), self.job_config))
    }

    /// Runs a batch for `prompt`, appends it to `session_id` and persists.
    ///
    /// Batch-level problems (no client, unknown session, invalid input) are
    /// reported before anything is submitted.
    pub async fn generate(
        &self,
        session_id: &str,
        prompt: &str,
        settings: GenerationSettings,
        options: GenerateOptions,
    ) -> Result<Generation> {
        let mut job = self.job()?;
        if self.sessions.get_session(session_id).await.is_none() {
            return Err(ReelError::not_found("Session", session_id));
        }
        if let Some(progress) = options.progress {
            job = job.with_progress(progress);
        }
        if let Some(token) = options.cancellation {
            job = job.with_cancellation(token);
        }

        let videos = job.run(prompt, &settings).await?;
        let generation = Generation::new(prompt.trim(), settings, videos);

        self.sessions
            .append_generation(session_id, generation.clone())
            .await?;
        self.sessions.persist().await?;
        tracing::info!(
            session_id,
            completed = generation.completed_count(),
            total = generation.videos.len(),
            "Recorded generation"
        );
        Ok(generation)
    }
}
