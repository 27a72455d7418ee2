//! Session entity migrations.

use super::traits::Migration;
use crate::dto::{
    GenerationV0, GenerationV1, SESSION_V1_VERSION, SessionV0, SessionV1, SettingsV0, SettingsV1,
    VideoV0, VideoV1,
};
use reelsmith_core::session::VideoStatus;
use reelsmith_core::settings::{AspectRatio, ImageMimeType, ImageReference, ModelVersion};
use reelsmith_core::{ReelError, Result};
use semver::Version;
use std::path::PathBuf;

/// Version assigned to documents without a `schema_version` marker.
pub const LEGACY_SESSION_VERSION: &str = "0.0.0";

/// Migration from the unversioned single-file format to 1.0.0.
///
/// Changes:
/// - Settings display labels become enum identifiers
/// - `image_gcs_uri` / `image_mime_type` become an optional `image` reference
///   (blank URIs are dropped)
/// - Empty `local_path` strings become absent paths
#[derive(Debug, Default)]
pub struct SessionV0ToV1Migration;

impl SessionV0ToV1Migration {
    fn migrate_settings(&self, settings: SettingsV0) -> Result<SettingsV1> {
        let mime_type = match settings.image_mime_type.as_deref().map(str::trim) {
            None | Some("") => ImageMimeType::default(),
            Some(mime) => mime.parse().map_err(|_| {
                ReelError::deserialization("legacy session", format!("Unsupported image MIME type '{mime}'"))
            })?,
        };

        Ok(SettingsV1 {
            aspect_ratio: legacy_aspect_ratio(&settings.aspect_ratio)?,
            model_version: legacy_model(&settings.model_version)?,
            num_variations: settings.num_variations,
            image: ImageReference::from_optional(settings.image_gcs_uri.as_deref(), mime_type),
        })
    }

    fn migrate_video(&self, video: VideoV0) -> Result<VideoV1> {
        let status = match video.status.trim().to_lowercase().as_str() {
            "completed" => VideoStatus::Completed,
            "timeout" => VideoStatus::Timeout,
            "failed" => VideoStatus::Failed,
            other => {
                return Err(ReelError::deserialization(
                    "legacy session",
                    format!("Unknown status '{other}' for video {}", video.id),
                ));
            }
        };

        let local_path = video
            .local_path
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(VideoV1 {
            id: video.id,
            prompt: video.prompt,
            aspect_ratio: legacy_aspect_ratio(&video.aspect_ratio)?,
            model_version: legacy_model(&video.model_version)?,
            created_at: video.created_at,
            local_path,
            status,
        })
    }

    fn migrate_generation(&self, generation: GenerationV0) -> Result<GenerationV1> {
        Ok(GenerationV1 {
            timestamp: generation.timestamp,
            prompt: generation.prompt,
            settings: self.migrate_settings(generation.settings)?,
            videos: generation
                .videos
                .into_iter()
                .map(|v| self.migrate_video(v))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

fn legacy_aspect_ratio(value: &str) -> Result<AspectRatio> {
    AspectRatio::parse(value).map_err(|e| ReelError::deserialization("legacy session", e.to_string()))
}

fn legacy_model(value: &str) -> Result<ModelVersion> {
    ModelVersion::parse(value).map_err(|e| ReelError::deserialization("legacy session", e.to_string()))
}

impl Migration<SessionV0, SessionV1> for SessionV0ToV1Migration {
    fn source_version(&self) -> Version {
        Version::new(0, 0, 0)
    }

    fn migrate(&self, v0: SessionV0) -> Result<SessionV1> {
        tracing::debug!(session_id = %v0.id, "Migrating legacy session record");

        Ok(SessionV1 {
            schema_version: SESSION_V1_VERSION.to_string(),
            id: v0.id,
            name: v0.name,
            created_at: v0.created_at,
            generations: v0
                .generations
                .into_iter()
                .map(|g| self.migrate_generation(g))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}
