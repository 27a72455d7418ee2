//! Artifact store trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

/// Durable area where generated video files live.
///
/// The store owns the files; `Video` records only reference them by path.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Derives a fresh path for `video_id` without creating the file.
    ///
    /// Two calls never return the same path.
    fn reserve_path(&self, video_id: &str, extension: &str) -> PathBuf;

    async fn exists(&self, path: &Path) -> bool;

    /// Writes `data` to `path`, replacing any previous content.
    async fn write_bytes(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Removes `path`, best-effort.
    ///
    /// Never fails: a missing file is a no-op and any other error is logged.
    /// Returns `true` when a file was actually removed.
    async fn delete(&self, path: &Path) -> bool;
}
