//! Filesystem [`ArtifactStore`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use reelsmith_core::artifact::ArtifactStore;
use reelsmith_core::{ReelError, Result};
use tokio::io::AsyncWriteExt;

/// Prefix of every artifact file name.
const ARTIFACT_PREFIX: &str = "veo3";

/// Stores artifacts as flat files in one directory:
/// `{root}/veo3_{video_id}_{YYYYmmdd_HHMMSS_mmm}.{ext}`.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    fn reserve_path(&self, video_id: &str, extension: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        self.root
            .join(format!("{ARTIFACT_PREFIX}_{video_id}_{stamp}.{extension}"))
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ReelError::persist(format!("Cannot create {}: {e}", parent.display()))
                })?;
            }
        }

        if let Err(e) = Self::write_file(path, bytes).await {
            // Never leave a truncated artifact behind.
            let _ = tokio::fs::remove_file(path).await;
            return Err(ReelError::persist(format!(
                "Failed to write {}: {e}",
                path.display()
            )));
        }

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote artifact");
        Ok(())
    }

    async fn delete(&self, path: &Path) -> bool {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted artifact");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Artifact already absent");
                false
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to delete artifact");
                false
            }
        }
    }
}
