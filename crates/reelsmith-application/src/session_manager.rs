use std::sync::Arc;

use reelsmith_core::artifact::ArtifactStore;
use reelsmith_core::session::{Generation, Session, SessionMap, SessionStore, default_session_name};
use reelsmith_core::{ReelError, Result};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Default)]
struct SessionState {
    sessions: SessionMap,
    active: Option<String>,
}

/// Owns the in-memory session map and the active-session pointer.
///
/// `SessionManager` is responsible for:
/// - Restoring sessions from the [`SessionStore`]
/// - Creating, renaming and selecting sessions
/// - Cascade deletion of a session's artifacts
/// - Appending finished generations
/// - Persisting the map, one save at a time
///
/// Mutations go through a single write lock, so there is at most one writer.
/// Nothing is persisted implicitly; call [`SessionManager::persist`].
pub struct SessionManager {
    state: RwLock<SessionState>,
    store: Arc<dyn SessionStore>,
    artifacts: Arc<dyn ArtifactStore>,
    /// Serializes saves of the session document.
    save_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            store,
            artifacts,
            save_lock: Mutex::new(()),
        }
    }

    /// Replaces the in-memory map with the stored one.
    ///
    /// # Errors
    ///
    /// On a load failure (e.g. `ReelError::Deserialization`) the in-memory
    /// state is reset to empty and the error is returned for reporting.
    pub async fn restore(&self) -> Result<usize> {
        let store = self.store.clone();
        let loaded = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| ReelError::internal(format!("Session load task failed: {e}")))?;

        let mut state = self.state.write().await;
        state.active = None;
        match loaded {
            Ok(sessions) => {
                let count = sessions.len();
                state.sessions = sessions;
                tracing::info!(count, "Restored sessions");
                Ok(count)
            }
            Err(e) => {
                state.sessions.clear();
                tracing::warn!(error = %e, "Could not load previous sessions, starting empty");
                Err(e)
            }
        }
    }

    /// Inserts a new empty session and returns its id.
    ///
    /// A blank or absent `name_hint` gets the default "Session <date time>" name.
    pub async fn create_session(&self, name_hint: Option<&str>) -> String {
        let name = name_hint
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(default_session_name);
        let session = Session::new(name);
        let id = session.id.clone();

        self.state.write().await.sessions.insert(id.clone(), session);
        tracing::info!(session_id = %id, "Created session");
        id
    }

    /// Deletes a session and every artifact it references.
    ///
    /// Unknown ids are a no-op. Artifact removal is best-effort; the session
    /// is always removed. Returns the number of files actually deleted.
    pub async fn delete_session(&self, session_id: &str) -> usize {
        let mut state = self.state.write().await;
        let Some(session) = state.sessions.get(session_id) else {
            tracing::debug!(session_id, "Delete of unknown session ignored");
            return 0;
        };

        let mut removed = 0;
        for path in session.artifact_paths() {
            if self.artifacts.delete(path).await {
                removed += 1;
            }
        }

        state.sessions.remove(session_id);
        if state.active.as_deref() == Some(session_id) {
            state.active = None;
        }
        tracing::info!(session_id, artifacts_removed = removed, "Deleted session");
        removed
    }

    /// Points the active-session reference at `session_id`.
    pub async fn select_session(&self, session_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.sessions.contains_key(session_id) {
            return Err(ReelError::not_found("Session", session_id));
        }
        state.active = Some(session_id.to_string());
        Ok(())
    }

    pub async fn active_session_id(&self) -> Option<String> {
        self.state.read().await.active.clone()
    }

    pub async fn active_session(&self) -> Option<Session> {
        let state = self.state.read().await;
        state
            .active
            .as_ref()
            .and_then(|id| state.sessions.get(id))
            .cloned()
    }

    /// Appends a finished generation to a session.
    ///
    /// # Errors
    ///
    /// `ReelError::NotFound` if the session no longer exists.
    pub async fn append_generation(&self, session_id: &str, generation: Generation) -> Result<()> {
        let mut state = self.state.write().await;
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| ReelError::not_found("Session", session_id))?;
        session.generations.push(generation);
        Ok(())
    }

    pub async fn rename_session(&self, session_id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReelError::validation("Session name must not be empty"));
        }

        let mut state = self.state.write().await;
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| ReelError::not_found("Session", session_id))?;
        session.name = name.to_string();
        Ok(())
    }

    pub async fn get_session(&self, session_id: &str) -> Option<Session> {
        self.state.read().await.sessions.get(session_id).cloned()
    }

    /// All sessions, oldest first.
    pub async fn list_sessions(&self) -> Vec<Session> {
        let state = self.state.read().await;
        let mut sessions: Vec<Session> = state.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        sessions
    }

    /// Generations of a session, newest first.
    pub async fn history(&self, session_id: &str) -> Result<Vec<Generation>> {
        let state = self.state.read().await;
        let session = state
            .sessions
            .get(session_id)
            .ok_or_else(|| ReelError::not_found("Session", session_id))?;
        Ok(session.generations.iter().rev().cloned().collect())
    }

    /// Writes the current map through the store.
    ///
    /// Saves never overlap; the map is snapshotted under the read lock.
    pub async fn persist(&self) -> Result<()> {
        let _guard = self.save_lock.lock().await;
        let snapshot = self.state.read().await.sessions.clone();
        let store = self.store.clone();

        tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .map_err(|e| ReelError::internal(format!("Session save task failed: {e}")))?
    }
}
