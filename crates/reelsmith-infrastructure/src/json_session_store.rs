//! JSON-backed [`SessionStore`] implementation.
//!
//! The whole session map lives in one document keyed by session id:
//!
//! ```text
//! data_dir/
//! ├── sessions.json        # canonical document, replaced atomically
//! └── veo3_*.mp4           # artifacts (see FsArtifactStore)
//! ```
//!
//! A legacy single-file document is read only when the canonical document
//! does not exist yet; its records are migrated and immediately written back
//! in canonical form.

use std::collections::BTreeMap;
use std::path::PathBuf;

use reelsmith_core::Result;
use reelsmith_core::config::StorageConfig;
use reelsmith_core::session::{SessionMap, SessionStore};
use serde_json::Value;

use crate::migration::{self, record_version};
use crate::storage::AtomicJsonFile;

type RawDocument = BTreeMap<String, Value>;

pub struct JsonSessionStore {
    canonical: AtomicJsonFile<RawDocument>,
    legacy: Option<AtomicJsonFile<RawDocument>>,
}

impl JsonSessionStore {
    /// Creates a store for the canonical document at `path`, without a
    /// legacy fallback.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            canonical: AtomicJsonFile::new(path.into()),
            legacy: None,
        }
    }

    /// Adds a legacy document consulted when the canonical one is missing.
    pub fn with_legacy_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.legacy = Some(AtomicJsonFile::new(path.into()));
        self
    }

    /// Builds the store described by the `[storage]` configuration section.
    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.sessions_path()).with_legacy_file(storage.legacy_sessions_file.clone())
    }

    pub fn path(&self) -> &std::path::Path {
        self.canonical.path()
    }

    /// Decodes every record, returning the map and how many records needed
    /// a schema migration.
    fn decode_document(document: RawDocument) -> Result<(SessionMap, usize)> {
        let mut sessions = SessionMap::new();
        let mut migrated = 0;

        for (key, record) in document {
            if record_version(&record)?.major == 0 {
                migrated += 1;
            }
            let session = migration::decode_session(record)?;
            if session.id != key {
                tracing::warn!(
                    key = %key,
                    session_id = %session.id,
                    "Session key does not match record id, using record id"
                );
            }
            sessions.insert(session.id.clone(), session);
        }

        Ok((sessions, migrated))
    }

    fn encode_document(sessions: &SessionMap) -> Result<RawDocument> {
        sessions
            .iter()
            .map(|(id, session)| Ok((id.clone(), migration::encode_session(session)?)))
            .collect()
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Result<SessionMap> {
        if let Some(document) = self.canonical.load()? {
            let (sessions, migrated) = Self::decode_document(document)?;
            if migrated > 0 {
                tracing::info!(
                    path = %self.canonical.path().display(),
                    migrated,
                    "Upgraded unversioned session records"
                );
                self.save(&sessions)?;
            }
            tracing::debug!(count = sessions.len(), "Loaded sessions");
            return Ok(sessions);
        }

        let Some(legacy) = &self.legacy else {
            return Ok(SessionMap::new());
        };

        match legacy.load()? {
            Some(document) => {
                let (sessions, _) = Self::decode_document(document)?;
                self.save(&sessions)?;
                tracing::info!(
                    from = %legacy.path().display(),
                    to = %self.canonical.path().display(),
                    count = sessions.len(),
                    "Migrated legacy session file"
                );
                Ok(sessions)
            }
            None => Ok(SessionMap::new()),
        }
    }

    fn save(&self, sessions: &SessionMap) -> Result<()> {
        let document = Self::encode_document(sessions)?;
        self.canonical.save(&document)?;
        tracing::debug!(count = sessions.len(), path = %self.canonical.path().display(), "Saved sessions");
        Ok(())
    }
}
