use std::time::Duration;

use serde::Serialize;

use crate::session::VideoStatus;

/// Progress of a running batch, keyed by variation.
///
/// `index` is zero-based; `total` is the number of requested variations.
/// Events for one variation are always emitted in the order
/// `VariationStarted`, `Polling`*, `VariationFinished`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    VariationStarted {
        index: u32,
        total: u32,
    },
    Polling {
        index: u32,
        total: u32,
        poll: u32,
        elapsed: Duration,
    },
    VariationFinished {
        index: u32,
        total: u32,
        status: VideoStatus,
    },
}

impl ProgressEvent {
    pub fn index(&self) -> u32 {
        match self {
            Self::VariationStarted { index, .. }
            | Self::Polling { index, .. }
            | Self::VariationFinished { index, .. } => *index,
        }
    }

    pub fn total(&self) -> u32 {
        match self {
            Self::VariationStarted { total, .. }
            | Self::Polling { total, .. }
            | Self::VariationFinished { total, .. } => *total,
        }
    }

    /// Overall batch completion in `0.0..=1.0`.
    ///
    /// A variation counts as half done while it is being polled.
    pub fn fraction(&self) -> f32 {
        let total = self.total().max(1) as f32;
        let index = self.index() as f32;
        match self {
            Self::VariationStarted { .. } => index / total,
            Self::Polling { .. } => (index + 0.5) / total,
            Self::VariationFinished { .. } => (index + 1.0) / total,
        }
    }

    /// One-line status text, numbering variations from 1.
    pub fn describe(&self) -> String {
        match self {
            Self::VariationStarted { index, total } => {
                format!("Generating video {} of {}...", index + 1, total)
            }
            Self::Polling {
                index,
                total,
                elapsed,
                ..
            } => format!(
                "Generating video {} of {}... ({}s elapsed)",
                index + 1,
                total,
                elapsed.as_secs()
            ),
            Self::VariationFinished {
                index,
                total,
                status,
            } => format!("Video {} of {} finished: {}", index + 1, total, status),
        }
    }
}
