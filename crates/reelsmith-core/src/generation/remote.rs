//! Remote generation capability.
//!
//! The orchestrator only needs three operations from the video service:
//! submit a request, refresh a long-running operation, and download the
//! finished artifact. Everything about the wire protocol lives behind this
//! trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::{AspectRatio, GenerationSettings, ImageReference, ModelVersion};

/// A single submission to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub model: ModelVersion,
    /// Videos requested per remote operation. The orchestrator always sends 1
    /// and fans out variations itself.
    pub variation_count: u32,
    pub image: Option<ImageReference>,
}

impl GenerationRequest {
    /// Request for one variation of `prompt` under `settings`.
    pub fn single(prompt: &str, settings: &GenerationSettings) -> Self {
        Self {
            prompt: prompt.to_string(),
            aspect_ratio: settings.aspect_ratio,
            model: settings.model_version,
            variation_count: 1,
            image: settings.image.clone(),
        }
    }
}

/// Where the service put a finished video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub uri: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Result carried by a finished operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Artifact(ArtifactRef),
    Error(String),
}

/// Handle to an in-progress remote job. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOperation {
    /// Service-assigned operation name used for polling.
    pub name: String,
    pub done: bool,
    /// Only meaningful once `done` is true.
    pub outcome: Option<OperationOutcome>,
}

impl RemoteOperation {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            outcome: None,
        }
    }

    pub fn succeeded(name: impl Into<String>, artifact: ArtifactRef) -> Self {
        Self {
            name: name.into(),
            done: true,
            outcome: Some(OperationOutcome::Artifact(artifact)),
        }
    }

    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            outcome: Some(OperationOutcome::Error(message.into())),
        }
    }
}

/// Capability handle for the remote video service.
///
/// A credential configures the handle; the orchestrator never sees it.
#[async_trait]
pub trait RemoteGenerationClient: Send + Sync {
    /// Starts a generation and returns its operation handle.
    async fn submit(&self, request: &GenerationRequest) -> Result<RemoteOperation>;

    /// Refreshes the state of `operation`.
    async fn poll(&self, operation: &RemoteOperation) -> Result<RemoteOperation>;

    /// Downloads the raw bytes of a finished artifact.
    async fn fetch(&self, artifact: &ArtifactRef) -> Result<Vec<u8>>;
}
