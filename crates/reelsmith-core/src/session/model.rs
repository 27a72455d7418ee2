//! Session domain model.
//!
//! A `Session` owns an ordered list of `Generation`s, each of which owns the
//! `Video` records produced by one batch. Videos only reference their
//! artifact files; the files themselves belong to the artifact store.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::settings::{AspectRatio, GenerationSettings, ModelVersion};

/// Allocates a fresh opaque identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Name given to a session created without an explicit name.
pub fn default_session_name() -> String {
    format!("Session {}", chrono::Local::now().format("%Y-%m-%d %H:%M"))
}

/// Terminal state of a single variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VideoStatus {
    Completed,
    Timeout,
    Failed,
}

/// One generated (or attempted) video.
///
/// Construct through [`Video::completed`], [`Video::timed_out`] or
/// [`Video::failed`]: a completed video always has a `local_path`, the other
/// states never do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub model_version: ModelVersion,
    /// Timestamp when the variation reached its terminal state (RFC 3339)
    pub created_at: String,
    pub local_path: Option<PathBuf>,
    pub status: VideoStatus,
    /// Failure or timeout message for display. Never persisted.
    #[serde(skip)]
    pub error: Option<String>,
}

impl Video {
    fn finalize(
        id: String,
        prompt: &str,
        settings: &GenerationSettings,
        status: VideoStatus,
        local_path: Option<PathBuf>,
        error: Option<String>,
    ) -> Self {
        Self {
            id,
            prompt: prompt.to_string(),
            aspect_ratio: settings.aspect_ratio,
            model_version: settings.model_version,
            created_at: now_rfc3339(),
            local_path,
            status,
            error,
        }
    }

    pub fn completed(
        id: String,
        prompt: &str,
        settings: &GenerationSettings,
        local_path: PathBuf,
    ) -> Self {
        Self::finalize(id, prompt, settings, VideoStatus::Completed, Some(local_path), None)
    }

    pub fn timed_out(
        id: String,
        prompt: &str,
        settings: &GenerationSettings,
        message: impl Into<String>,
    ) -> Self {
        Self::finalize(
            id,
            prompt,
            settings,
            VideoStatus::Timeout,
            None,
            Some(message.into()),
        )
    }

    pub fn failed(
        id: String,
        prompt: &str,
        settings: &GenerationSettings,
        message: impl Into<String>,
    ) -> Self {
        Self::finalize(
            id,
            prompt,
            settings,
            VideoStatus::Failed,
            None,
            Some(message.into()),
        )
    }

    pub fn is_completed(&self) -> bool {
        self.status == VideoStatus::Completed
    }

    /// Artifact backing this video, if any.
    pub fn artifact_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }
}

/// A single prompt submission and the videos it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Timestamp when the batch finished (RFC 3339)
    pub timestamp: String,
    pub prompt: String,
    pub settings: GenerationSettings,
    pub videos: Vec<Video>,
}

impl Generation {
    pub fn new(prompt: impl Into<String>, settings: GenerationSettings, videos: Vec<Video>) -> Self {
        Self {
            timestamp: now_rfc3339(),
            prompt: prompt.into(),
            settings,
            videos,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.videos.iter().filter(|v| v.is_completed()).count()
    }
}

/// A named, persisted container of generation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Display name
    pub name: String,
    /// Timestamp when the session was created (RFC 3339)
    pub created_at: String,
    /// Generations in submission order
    pub generations: Vec<Generation>,
}

impl Session {
    /// Creates an empty session with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            created_at: now_rfc3339(),
            generations: Vec::new(),
        }
    }

    /// Every artifact path referenced by the session's videos.
    pub fn artifact_paths(&self) -> impl Iterator<Item = &Path> {
        self.generations
            .iter()
            .flat_map(|g| g.videos.iter())
            .filter_map(Video::artifact_path)
    }

    pub fn video_count(&self) -> usize {
        self.generations.iter().map(|g| g.videos.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GenerationSettings {
        GenerationSettings::new(AspectRatio::Widescreen, ModelVersion::Veo3Fast, 2)
    }

    #[test]
    fn completed_video_carries_path() {
        let video = Video::completed(new_id(), "a cat", &settings(), PathBuf::from("/tmp/a.mp4"));
        assert!(video.is_completed());
        assert_eq!(video.artifact_path(), Some(Path::new("/tmp/a.mp4")));
        assert!(video.error.is_none());
    }

    #[test]
    fn terminal_failures_have_no_path() {
        let timed_out = Video::timed_out(new_id(), "a cat", &settings(), "too slow");
        let failed = Video::failed(new_id(), "a cat", &settings(), "rejected");
        assert_eq!(timed_out.status, VideoStatus::Timeout);
        assert_eq!(failed.status, VideoStatus::Failed);
        assert!(timed_out.local_path.is_none());
        assert!(failed.local_path.is_none());
        assert_eq!(failed.error.as_deref(), Some("rejected"));
    }

    #[test]
    fn error_message_is_not_serialized() {
        let failed = Video::failed(new_id(), "a cat", &settings(), "rejected");
        let json = serde_json::to_value(&failed).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["status"], "failed");
    }

    #[test]
    fn session_lists_only_existing_artifact_references() {
        let mut session = Session::new("demo");
        session.generations.push(Generation::new(
            "a cat",
            settings(),
            vec![
                Video::completed(new_id(), "a cat", &settings(), PathBuf::from("/tmp/a.mp4")),
                Video::timed_out(new_id(), "a cat", &settings(), "too slow"),
            ],
        ));
        let paths: Vec<_> = session.artifact_paths().collect();
        assert_eq!(paths, vec![Path::new("/tmp/a.mp4")]);
        assert_eq!(session.video_count(), 2);
        assert_eq!(session.generations[0].completed_count(), 1);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(Session::new("a").id, Session::new("b").id);
    }

    #[test]
    fn default_name_has_prefix() {
        assert!(default_session_name().starts_with("Session "));
    }
}
