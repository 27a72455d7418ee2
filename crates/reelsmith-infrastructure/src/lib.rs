pub mod artifact_store;
pub mod config_service;
pub mod dto;
pub mod json_session_store;
pub mod migration;
pub mod paths;
pub mod storage;

pub use crate::artifact_store::FsArtifactStore;
pub use crate::config_service::{API_KEY_ENV, ConfigService};
pub use crate::json_session_store::JsonSessionStore;
pub use crate::paths::ReelsmithPaths;
