//! Generation settings: the enumerated options a prompt is rendered with.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{ReelError, Result};

/// Largest batch a single generation may request.
pub const MAX_VARIATIONS: u32 = 4;

/// Frame aspect ratio accepted by the video models.
///
/// Parses from either the ratio itself (`"16:9"`) or the display label
/// (`"16:9 (Widescreen)"`); always serializes as the bare ratio.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    #[strum(to_string = "16:9", serialize = "16:9 (Widescreen)")]
    Widescreen,
    #[serde(rename = "9:16")]
    #[strum(to_string = "9:16", serialize = "9:16 (Portrait)")]
    Portrait,
    #[serde(rename = "1:1")]
    #[strum(to_string = "1:1", serialize = "1:1 (Square)")]
    Square,
    #[serde(rename = "4:3")]
    #[strum(to_string = "4:3", serialize = "4:3 (Standard)")]
    Standard,
    #[serde(rename = "3:2")]
    #[strum(to_string = "3:2", serialize = "3:2 (Photo)")]
    Photo,
    #[serde(rename = "21:9")]
    #[strum(to_string = "21:9", serialize = "21:9 (Cinema)")]
    Cinema,
    #[serde(rename = "4:5")]
    #[strum(to_string = "4:5", serialize = "4:5 (Portrait)")]
    TallPortrait,
    #[serde(rename = "2:3")]
    #[strum(to_string = "2:3", serialize = "2:3 (Portrait)")]
    PhotoPortrait,
}

impl AspectRatio {
    /// Human-readable label shown in pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Widescreen => "16:9 (Widescreen)",
            Self::Portrait => "9:16 (Portrait)",
            Self::Square => "1:1 (Square)",
            Self::Standard => "4:3 (Standard)",
            Self::Photo => "3:2 (Photo)",
            Self::Cinema => "21:9 (Cinema)",
            Self::TallPortrait => "4:5 (Portrait)",
            Self::PhotoPortrait => "2:3 (Portrait)",
        }
    }

    /// All supported ratios, widescreen first.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    /// Parses a ratio or a label.
    pub fn parse(value: &str) -> Result<Self> {
        value
            .trim()
            .parse()
            .map_err(|_| ReelError::validation(format!("Unsupported aspect ratio '{value}'")))
    }
}

/// Video model identifier on the remote service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum ModelVersion {
    #[default]
    #[serde(rename = "veo-3.0-fast-generate-preview")]
    #[strum(to_string = "veo-3.0-fast-generate-preview", serialize = "Veo 3 Fast")]
    Veo3Fast,
    #[serde(rename = "veo-3.0-generate-preview")]
    #[strum(to_string = "veo-3.0-generate-preview", serialize = "Veo 3 Quality")]
    Veo3Quality,
}

impl ModelVersion {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Veo3Fast => "Veo 3 Fast",
            Self::Veo3Quality => "Veo 3 Quality",
        }
    }

    /// The identifier sent to the remote API.
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::Veo3Fast => "veo-3.0-fast-generate-preview",
            Self::Veo3Quality => "veo-3.0-generate-preview",
        }
    }

    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    pub fn parse(value: &str) -> Result<Self> {
        value
            .trim()
            .parse()
            .map_err(|_| ReelError::validation(format!("Unsupported model '{value}'")))
    }
}

/// MIME types accepted for a reference image.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum ImageMimeType {
    #[default]
    #[serde(rename = "image/png")]
    #[strum(serialize = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    #[strum(serialize = "image/jpeg")]
    Jpeg,
}

/// A reference image stored in cloud storage that guides generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Storage URI, e.g. `gs://bucket/path/to/image.png`.
    pub uri: String,
    #[serde(default)]
    pub mime_type: ImageMimeType,
}

impl ImageReference {
    /// Builds a reference, treating a blank URI as "no image".
    pub fn from_optional(uri: Option<&str>, mime_type: ImageMimeType) -> Option<Self> {
        uri.map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| Self {
                uri: u.to_string(),
                mime_type,
            })
    }
}

/// Settings recorded alongside every generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub aspect_ratio: AspectRatio,
    pub model_version: ModelVersion,
    pub num_variations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageReference>,
}

impl GenerationSettings {
    pub fn new(aspect_ratio: AspectRatio, model_version: ModelVersion, num_variations: u32) -> Self {
        Self {
            aspect_ratio,
            model_version,
            num_variations,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Option<ImageReference>) -> Self {
        self.image = image;
        self
    }

    /// Rejects variation counts outside `1..=MAX_VARIATIONS`.
    pub fn validate(&self) -> Result<()> {
        if self.num_variations == 0 || self.num_variations > MAX_VARIATIONS {
            return Err(ReelError::validation(format!(
                "Number of variations must be between 1 and {MAX_VARIATIONS}, got {}",
                self.num_variations
            )));
        }
        Ok(())
    }
}
