//! In-memory collaborators for unit tests.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use reelsmith_core::artifact::ArtifactStore;
use reelsmith_core::generation::{
    ArtifactRef, GenerationRequest, RemoteGenerationClient, RemoteOperation,
};
use reelsmith_core::session::{SessionMap, SessionStore};
use reelsmith_core::{ReelError, Result};

/// How the remote side behaves for one submitted variation.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    DoneAfter(u32),
    NeverDone,
    SubmitError(String),
    FailAfter(u32, String),
    DoneWithoutResult,
    FetchError,
    /// `n` retryable poll errors, then done after `m` more polls.
    TransientThenDone(u32, u32),
    PollError,
}

/// Remote client that plays one [`Script`] per submission, in order.
pub(crate) struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    operations: Mutex<HashMap<String, (Script, u32)>>,
    submit_calls: AtomicU32,
    poll_calls: AtomicU32,
}

impl ScriptedClient {
    pub(crate) fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            operations: Mutex::new(HashMap::new()),
            submit_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn poll_calls(&self) -> u32 {
        self.poll_calls.load(Ordering::SeqCst)
    }
}

fn artifact(name: &str, uri: &str) -> RemoteOperation {
    RemoteOperation::succeeded(
        name,
        ArtifactRef {
            uri: uri.to_string(),
            mime_type: Some("video/mp4".to_string()),
        },
    )
}

#[async_trait]
impl RemoteGenerationClient for ScriptedClient {
    async fn submit(&self, _request: &GenerationRequest) -> Result<RemoteOperation> {
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::DoneAfter(1));

        if let Script::SubmitError(message) = &script {
            return Err(ReelError::Remote {
                status_code: Some(429),
                message: message.clone(),
                is_retryable: true,
            });
        }

        let name = format!("operations/op-{n}");
        self.operations
            .lock()
            .unwrap()
            .insert(name.clone(), (script, 0));
        Ok(RemoteOperation::pending(name))
    }

    async fn poll(&self, operation: &RemoteOperation) -> Result<RemoteOperation> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        let mut operations = self.operations.lock().unwrap();
        let (script, polls) = operations.get_mut(&operation.name).unwrap();
        *polls += 1;
        let name = operation.name.as_str();

        Ok(match script {
            Script::DoneAfter(n) if *polls >= *n => artifact(name, &format!("mem://{name}")),
            Script::FailAfter(n, message) if *polls >= *n => RemoteOperation::failed(name, message.clone()),
            Script::DoneWithoutResult => RemoteOperation {
                name: name.to_string(),
                done: true,
                outcome: None,
            },
            Script::FetchError => artifact(name, "mem://fetch-fail"),
            Script::TransientThenDone(errors, _) if *polls <= *errors => {
                return Err(ReelError::Remote {
                    status_code: Some(503),
                    message: "unavailable".into(),
                    is_retryable: true,
                });
            }
            Script::TransientThenDone(errors, after) if *polls - *errors >= *after => {
                artifact(name, &format!("mem://{name}"))
            }
            Script::PollError => {
                return Err(ReelError::Remote {
                    status_code: Some(400),
                    message: "bad operation name".into(),
                    is_retryable: false,
                });
            }
            _ => RemoteOperation::pending(name),
        })
    }

    async fn fetch(&self, artifact: &ArtifactRef) -> Result<Vec<u8>> {
        if artifact.uri.ends_with("fetch-fail") {
            return Err(ReelError::Remote {
                status_code: Some(404),
                message: "file expired".into(),
                is_retryable: false,
            });
        }
        Ok(artifact.uri.as_bytes().to_vec())
    }
}

/// Artifact store backed by a map.
#[derive(Default)]
pub(crate) struct MemoryArtifactStore {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    fail_writes: bool,
}

impl MemoryArtifactStore {
    pub(crate) fn failing() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            fail_writes: true,
        }
    }

    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    pub(crate) fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    fn reserve_path(&self, video_id: &str, extension: &str) -> PathBuf {
        PathBuf::from(format!("/mem/veo3_{video_id}.{extension}"))
    }

    async fn exists(&self, path: &Path) -> bool {
        self.contains(path)
    }

    async fn write_bytes(&self, path: &Path, data: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(ReelError::persist("disk full"));
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    async fn delete(&self, path: &Path) -> bool {
        self.files.lock().unwrap().remove(path).is_some()
    }
}

/// Session store that keeps the last saved map.
#[derive(Default)]
pub(crate) struct MemorySessionStore {
    saved: Mutex<Option<SessionMap>>,
    saves: AtomicU32,
    fail_load: bool,
}

impl MemorySessionStore {
    pub(crate) fn with_sessions(sessions: SessionMap) -> Self {
        Self {
            saved: Mutex::new(Some(sessions)),
            ..Default::default()
        }
    }

    pub(crate) fn corrupt() -> Self {
        Self {
            fail_load: true,
            ..Default::default()
        }
    }

    pub(crate) fn saved(&self) -> Option<SessionMap> {
        self.saved.lock().unwrap().clone()
    }

    pub(crate) fn saves(&self) -> u32 {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionMap> {
        if self.fail_load {
            return Err(ReelError::deserialization("JSON", "expected value at line 1 column 1"));
        }
        Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
    }

    fn save(&self, sessions: &SessionMap) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.saved.lock().unwrap() = Some(sessions.clone());
        Ok(())
    }
}
