//! Session store trait.
//!
//! Defines the interface for persisting the full session mapping.

use std::collections::BTreeMap;

use super::model::Session;
use crate::error::Result;

/// All known sessions keyed by session id.
pub type SessionMap = BTreeMap<String, Session>;

/// Durable record of sessions, generations and videos.
///
/// The store always reads and writes the whole mapping. Implementations must
/// make `save` atomic for a concurrent reader of the canonical document;
/// callers are responsible for never running two saves at once.
pub trait SessionStore: Send + Sync {
    /// Loads every persisted session.
    ///
    /// # Returns
    ///
    /// - `Ok(map)`: stored sessions (empty when nothing has been saved yet)
    /// - `Err(ReelError::Deserialization)`: the document exists but cannot be parsed
    fn load(&self) -> Result<SessionMap>;

    /// Replaces the persisted document with `sessions`.
    ///
    /// Errors are surfaced, never retried.
    fn save(&self, sessions: &SessionMap) -> Result<()>;
}
