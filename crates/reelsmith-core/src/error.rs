//! Error types for reelsmith.

use thiserror::Error;

/// A shared error type for the whole reelsmith workspace.
///
/// Variants follow the failure taxonomy of the generation pipeline:
/// batch-level failures (`Configuration`, `Validation`) abort before any
/// remote call, per-variation failures (`Submission`, `PollTimeout`,
/// `Download`, `Persist`, `Remote`) are recorded on the affected video and
/// never abort a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReelError {
    /// Missing or invalid credential / configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request rejected before it reached the remote service.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote service refused a generation request.
    #[error("Submission error: {0}")]
    Submission(String),

    /// Poll budget exhausted before the remote operation finished.
    #[error("Generation timed out after {elapsed_secs}s ({polls} polls)")]
    PollTimeout { polls: u32, elapsed_secs: u64 },

    /// The finished artifact could not be downloaded.
    #[error("Download error: {0}")]
    Download(String),

    /// The artifact or the session file could not be written.
    #[error("Persist error: {0}")]
    Persist(String),

    /// The session file could not be parsed.
    #[error("Deserialization error: {format} - {message}")]
    Deserialization { format: String, message: String },

    /// Filesystem error (file system operations)
    #[error("Filesystem error: {message}")]
    Filesystem { message: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// HTTP-level failure reported by the remote generation service.
    #[error("Remote service error{}: {message}", .status_code.map(|c| format!(" ({c})")).unwrap_or_default())]
    Remote {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
    },

    /// The batch was abandoned through its cancellation token.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReelError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission(message.into())
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::Download(message.into())
    }

    pub fn persist(message: impl Into<String>) -> Self {
        Self::Persist(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Deserialization error for the given format ("JSON", "TOML", ...)
    pub fn deserialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Deserialization {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn filesystem(message: impl Into<String>) -> Self {
        Self::Filesystem {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_deserialization(&self) -> bool {
        matches!(self, Self::Deserialization { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::PollTimeout { .. })
    }

    /// Whether retrying the same remote call may succeed.
    ///
    /// Only transport-level remote errors flagged by the client qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                is_retryable: true,
                ..
            }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ReelError {
    fn from(err: std::io::Error) -> Self {
        Self::Filesystem {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(err: serde_json::Error) -> Self {
        Self::deserialization("JSON", err.to_string())
    }
}

impl From<toml::de::Error> for ReelError {
    fn from(err: toml::de::Error) -> Self {
        Self::deserialization("TOML", err.to_string())
    }
}

/// A type alias for `Result<T, ReelError>`.
pub type Result<T> = std::result::Result<T, ReelError>;
