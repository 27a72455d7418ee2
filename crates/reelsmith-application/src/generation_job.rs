//! Generation job: one prompt, N variations, one polling state machine each.
//!
//! ```text
//! SUBMITTED ──▶ POLLING ──┬──▶ DONE_SUCCESS ──▶ fetch + write ──▶ completed
//!     │                   ├──▶ DONE_FAILURE ──────────────────▶ failed
//!     │                   └──▶ TIMED_OUT ─────────────────────▶ timeout
//!     └── submit error ───────────────────────────────────────▶ failed
//! ```
//!
//! Variations run strictly in order. Whatever happens to a single variation,
//! [`GenerationJob::run`] returns exactly one [`Video`] per requested
//! variation, in request order.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reelsmith_core::artifact::ArtifactStore;
use reelsmith_core::config::GenerationConfig;
use reelsmith_core::generation::{
    ArtifactRef, GenerationRequest, OperationOutcome, ProgressEvent, RemoteGenerationClient,
    RemoteOperation,
};
use reelsmith_core::session::{Video, VideoStatus, new_id};
use reelsmith_core::settings::GenerationSettings;
use reelsmith_core::{ReelError, Result};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

const ARTIFACT_EXTENSION: &str = "mp4";

/// Poll cadence and budget for one variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationJobConfig {
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl Default for GenerationJobConfig {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for GenerationJobConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_polls: config.max_polls,
        }
    }
}

/// Explicit poll bookkeeping for a variation in the POLLING state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PollState {
    polls: u32,
    elapsed: Duration,
}

/// Terminal state of the remote part of a variation.
#[derive(Debug)]
enum RemoteTerminal {
    Done(ArtifactRef),
    Failed(ReelError),
    TimedOut(PollState),
}

/// Produces the videos for one prompt.
pub struct GenerationJob {
    client: Arc<dyn RemoteGenerationClient>,
    artifacts: Arc<dyn ArtifactStore>,
    config: GenerationJobConfig,
    progress: Option<UnboundedSender<ProgressEvent>>,
    cancellation: CancellationToken,
}

impl GenerationJob {
    pub fn new(
        client: Arc<dyn RemoteGenerationClient>,
        artifacts: Arc<dyn ArtifactStore>,
        config: GenerationJobConfig,
    ) -> Self {
        Self {
            client,
            artifacts,
            config,
            progress: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Streams progress events to `sender`. A dropped receiver is ignored.
    pub fn with_progress(mut self, sender: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Checked before each variation starts.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Runs every variation of `settings` for `prompt`.
    ///
    /// # Errors
    ///
    /// Only batch-level problems are errors (`ReelError::Validation` for an
    /// empty prompt or a bad variation count), and they are raised before any
    /// remote call. Per-variation failures become `failed` / `timeout` videos.
    pub async fn run(&self, prompt: &str, settings: &GenerationSettings) -> Result<Vec<Video>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ReelError::validation("Prompt must not be empty"));
        }
        settings.validate()?;

        let total = settings.num_variations;
        tracing::info!(
            total,
            model = settings.model_version.model_id(),
            aspect_ratio = %settings.aspect_ratio,
            "Starting generation batch"
        );

        let mut videos = Vec::with_capacity(total as usize);
        for index in 0..total {
            if self.cancellation.is_cancelled() {
                tracing::info!(variation = index, "Batch cancelled, skipping variation");
                let cancelled = ReelError::Cancelled("batch cancelled before this variation started".into());
                videos.push(Video::failed(new_id(), prompt, settings, cancelled.to_string()));
                continue;
            }

            self.emit(ProgressEvent::VariationStarted { index, total });
            let video = self.run_variation(index, total, prompt, settings).await;
            self.emit(ProgressEvent::VariationFinished {
                index,
                total,
                status: video.status,
            });
            videos.push(video);
        }

        let completed = videos.iter().filter(|v| v.status == VideoStatus::Completed).count();
        tracing::info!(total, completed, "Generation batch finished");
        Ok(videos)
    }

    async fn run_variation(
        &self,
        index: u32,
        total: u32,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Video {
        let video_id = new_id();

        match self.drive_remote(index, total, prompt, settings).await {
            RemoteTerminal::Done(artifact) => match self.materialize(&video_id, &artifact).await {
                Ok(path) => {
                    tracing::info!(variation = index, video_id = %video_id, path = %path.display(), "Variation completed");
                    Video::completed(video_id, prompt, settings, path)
                }
                Err(e) => {
                    tracing::error!(variation = index, video_id = %video_id, error = %e, "Failed to store artifact");
                    Video::failed(video_id, prompt, settings, e.to_string())
                }
            },
            RemoteTerminal::TimedOut(state) => {
                let e = ReelError::PollTimeout {
                    polls: state.polls,
                    elapsed_secs: state.elapsed.as_secs(),
                };
                tracing::warn!(variation = index, video_id = %video_id, "{e}");
                Video::timed_out(video_id, prompt, settings, e.to_string())
            }
            RemoteTerminal::Failed(e) => {
                tracing::error!(variation = index, video_id = %video_id, error = %e, "Variation failed");
                Video::failed(video_id, prompt, settings, e.to_string())
            }
        }
    }

    /// SUBMITTED → POLLING → terminal.
    async fn drive_remote(
        &self,
        index: u32,
        total: u32,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> RemoteTerminal {
        let request = GenerationRequest::single(prompt, settings);
        let mut operation = match self.client.submit(&request).await {
            Ok(operation) => operation,
            Err(e) => return RemoteTerminal::Failed(ReelError::submission(e.to_string())),
        };
        tracing::debug!(variation = index, operation = %operation.name, "Submitted");

        let mut state = PollState::default();
        while !operation.done && state.polls < self.config.max_polls {
            tokio::time::sleep(self.config.poll_interval).await;
            state.polls += 1;
            state.elapsed += self.config.poll_interval;

            match self.client.poll(&operation).await {
                Ok(next) => operation = next,
                Err(e) if e.is_retryable() => {
                    tracing::warn!(variation = index, poll = state.polls, error = %e, "Transient poll failure");
                }
                Err(e) => return RemoteTerminal::Failed(e),
            }

            tracing::debug!(variation = index, poll = state.polls, done = operation.done, "Polled");
            self.emit(ProgressEvent::Polling {
                index,
                total,
                poll: state.polls,
                elapsed: state.elapsed,
            });
        }

        if !operation.done {
            return RemoteTerminal::TimedOut(state);
        }
        Self::finish(operation)
    }

    fn finish(operation: RemoteOperation) -> RemoteTerminal {
        match operation.outcome {
            Some(OperationOutcome::Artifact(artifact)) => RemoteTerminal::Done(artifact),
            Some(OperationOutcome::Error(message)) => RemoteTerminal::Failed(ReelError::Remote {
                status_code: None,
                message,
                is_retryable: false,
            }),
            None => RemoteTerminal::Failed(ReelError::Remote {
                status_code: None,
                message: format!("Operation {} finished without a usable result", operation.name),
                is_retryable: false,
            }),
        }
    }

    /// DONE_SUCCESS: download, then write through the artifact store.
    async fn materialize(&self, video_id: &str, artifact: &ArtifactRef) -> Result<PathBuf> {
        let bytes = self.client.fetch(artifact).await.map_err(|e| match e {
            ReelError::Download(_) => e,
            other => ReelError::download(other.to_string()),
        })?;

        let path = self.artifacts.reserve_path(video_id, ARTIFACT_EXTENSION);
        self.artifacts.write_bytes(&path, &bytes).await?;
        Ok(path)
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(event);
        }
    }
}
