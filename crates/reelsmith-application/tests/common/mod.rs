#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reelsmith_application::{GenerationJobConfig, OrchestratorState};
use reelsmith_core::generation::{ArtifactRef, GenerationRequest, RemoteGenerationClient, RemoteOperation};
use reelsmith_core::{ReelError, Result};
use reelsmith_infrastructure::{FsArtifactStore, JsonSessionStore};

/// Remote behaviour for one submission.
#[derive(Debug, Clone, Copy)]
pub enum Remote {
    DoneAfter(u32),
    NeverDone,
    RejectSubmit,
}

/// Fake video service: plays one [`Remote`] per submit, in order.
pub struct FakeVideoService {
    plans: Mutex<VecDeque<Remote>>,
    progress: Mutex<HashMap<String, (Remote, u32)>>,
    submits: AtomicU32,
    polls: AtomicU32,
}

impl FakeVideoService {
    pub fn new(plans: impl IntoIterator<Item = Remote>) -> Arc<Self> {
        Arc::new(Self {
            plans: Mutex::new(plans.into_iter().collect()),
            progress: Mutex::new(HashMap::new()),
            submits: AtomicU32::new(0),
            polls: AtomicU32::new(0),
        })
    }

    pub fn submits(&self) -> u32 {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteGenerationClient for FakeVideoService {
    async fn submit(&self, request: &GenerationRequest) -> Result<RemoteOperation> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst);
        let plan = self.plans.lock().unwrap().pop_front().unwrap_or(Remote::DoneAfter(1));
        if let Remote::RejectSubmit = plan {
            return Err(ReelError::Remote {
                status_code: Some(400),
                message: format!("prompt rejected: {}", request.prompt),
                is_retryable: false,
            });
        }
        let name = format!("models/veo/operations/{n}");
        self.progress.lock().unwrap().insert(name.clone(), (plan, 0));
        Ok(RemoteOperation::pending(name))
    }

    async fn poll(&self, operation: &RemoteOperation) -> Result<RemoteOperation> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let mut progress = self.progress.lock().unwrap();
        let (plan, polls) = progress.get_mut(&operation.name).unwrap();
        *polls += 1;
        Ok(match *plan {
            Remote::DoneAfter(n) if *polls >= n => RemoteOperation::succeeded(
                operation.name.clone(),
                ArtifactRef {
                    uri: format!("https://files.test/{}", operation.name),
                    mime_type: Some("video/mp4".into()),
                },
            ),
            _ => RemoteOperation::pending(operation.name.clone()),
        })
    }

    async fn fetch(&self, artifact: &ArtifactRef) -> Result<Vec<u8>> {
        Ok(format!("MP4:{}", artifact.uri).into_bytes())
    }
}

/// Orchestrator wired to real filesystem stores under `root`.
pub fn orchestrator(root: &Path, client: Option<Arc<FakeVideoService>>) -> OrchestratorState {
    let store = JsonSessionStore::new(root.join("generated_videos").join("sessions.json"))
        .with_legacy_file(root.join("veo3_sessions.json"));
    let artifacts = FsArtifactStore::new(root.join("generated_videos"));
    let state = OrchestratorState::new(
        Arc::new(store),
        Arc::new(artifacts),
        GenerationJobConfig::default(),
    );
    match client {
        Some(client) => state.with_client(client),
        None => state,
    }
}
