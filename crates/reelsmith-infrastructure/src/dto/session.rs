//! Session DTOs.
//!
//! Two on-disk shapes exist:
//!
//! - **V0**: the unversioned document written by the original single-file
//!   tool. Settings hold display labels (`"16:9 (Widescreen)"`,
//!   `"Veo 3 Fast"`), the reference image is a bare `image_gcs_uri` that may
//!   be `""`, and `local_path` is `""` or `null` for videos without an
//!   artifact.
//! - **V1 (1.0.0)**: the canonical schema. Every session record carries
//!   `schema_version`; unknown fields are rejected instead of dropped.
//!
//! Video DTOs list their persisted fields explicitly, so in-memory-only
//! fields of the domain model never reach the document.

use std::path::PathBuf;

use reelsmith_core::session::{Generation, Session, Video, VideoStatus};
use reelsmith_core::settings::{AspectRatio, GenerationSettings, ImageReference, ModelVersion};
use serde::{Deserialize, Serialize};

pub const SESSION_V1_VERSION: &str = "1.0.0";

// ============================================================================
// V0 (legacy, unversioned)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionV0 {
    pub id: String,
    pub created_at: String,
    pub name: String,
    #[serde(default)]
    pub generations: Vec<GenerationV0>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerationV0 {
    pub timestamp: String,
    pub prompt: String,
    pub settings: SettingsV0,
    #[serde(default)]
    pub videos: Vec<VideoV0>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingsV0 {
    /// Ratio or display label
    pub aspect_ratio: String,
    /// Model id or display label
    pub model_version: String,
    pub num_variations: u32,
    #[serde(default)]
    pub image_gcs_uri: Option<String>,
    #[serde(default)]
    pub image_mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoV0 {
    pub id: String,
    pub prompt: String,
    pub aspect_ratio: String,
    pub model_version: String,
    pub created_at: String,
    #[serde(default)]
    pub local_path: Option<String>,
    pub status: String,
}

// ============================================================================
// V1 (1.0.0, canonical)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionV1 {
    pub schema_version: String,
    pub id: String,
    pub name: String,
    pub created_at: String,
    #[serde(default)]
    pub generations: Vec<GenerationV1>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationV1 {
    pub timestamp: String,
    pub prompt: String,
    pub settings: SettingsV1,
    #[serde(default)]
    pub videos: Vec<VideoV1>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsV1 {
    pub aspect_ratio: AspectRatio,
    pub model_version: ModelVersion,
    pub num_variations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoV1 {
    pub id: String,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub model_version: ModelVersion,
    pub created_at: String,
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    pub status: VideoStatus,
}

// ============================================================================
// Domain conversions
// ============================================================================

impl From<&Session> for SessionV1 {
    fn from(session: &Session) -> Self {
        Self {
            schema_version: SESSION_V1_VERSION.to_string(),
            id: session.id.clone(),
            name: session.name.clone(),
            created_at: session.created_at.clone(),
            generations: session.generations.iter().map(GenerationV1::from).collect(),
        }
    }
}

impl From<&Generation> for GenerationV1 {
    fn from(generation: &Generation) -> Self {
        Self {
            timestamp: generation.timestamp.clone(),
            prompt: generation.prompt.clone(),
            settings: SettingsV1::from(&generation.settings),
            videos: generation.videos.iter().map(VideoV1::from).collect(),
        }
    }
}

impl From<&GenerationSettings> for SettingsV1 {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            aspect_ratio: settings.aspect_ratio,
            model_version: settings.model_version,
            num_variations: settings.num_variations,
            image: settings.image.clone(),
        }
    }
}

impl From<&Video> for VideoV1 {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id.clone(),
            prompt: video.prompt.clone(),
            aspect_ratio: video.aspect_ratio,
            model_version: video.model_version,
            created_at: video.created_at.clone(),
            local_path: video.local_path.clone(),
            status: video.status,
        }
    }
}

impl From<SessionV1> for Session {
    fn from(dto: SessionV1) -> Self {
        Session {
            id: dto.id,
            name: dto.name,
            created_at: dto.created_at,
            generations: dto.generations.into_iter().map(Generation::from).collect(),
        }
    }
}

impl From<GenerationV1> for Generation {
    fn from(dto: GenerationV1) -> Self {
        Generation {
            timestamp: dto.timestamp,
            prompt: dto.prompt,
            settings: GenerationSettings {
                aspect_ratio: dto.settings.aspect_ratio,
                model_version: dto.settings.model_version,
                num_variations: dto.settings.num_variations,
                image: dto.settings.image,
            },
            videos: dto.videos.into_iter().map(Video::from).collect(),
        }
    }
}

/// Restores the status/path invariant on records edited outside the tool:
/// a completed video without a path is downgraded to failed, and a path on a
/// non-completed video is dropped.
impl From<VideoV1> for Video {
    fn from(dto: VideoV1) -> Self {
        let (status, local_path) = match (dto.status, dto.local_path) {
            (VideoStatus::Completed, Some(path)) => (VideoStatus::Completed, Some(path)),
            (VideoStatus::Completed, None) => {
                tracing::warn!(video_id = %dto.id, "Completed video without artifact path, marking as failed");
                (VideoStatus::Failed, None)
            }
            (status, _) => (status, None),
        };

        Video {
            id: dto.id,
            prompt: dto.prompt,
            aspect_ratio: dto.aspect_ratio,
            model_version: dto.model_version,
            created_at: dto.created_at,
            local_path,
            status,
            error: None,
        }
    }
}
