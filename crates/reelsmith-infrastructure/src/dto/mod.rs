//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema of the session document.
//! They are private to the infrastructure layer and absorb the evolution
//! of the storage format over time.
//!
//! ## Schema Versioning (Semantic Versioning)
//!
//! - **MAJOR (X.0.0)**: Breaking changes (field removal, type changes)
//! - **MINOR (1.X.0)**: Backward-compatible additions (new optional fields)
//!
//! ### Session Version History
//! - **V0 (unversioned)**: single-file format with display labels as settings
//! - **1.0.0**: `schema_version` marker, enum-typed settings, optional image reference

mod session;

pub use session::{
    GenerationV0, GenerationV1, SESSION_V1_VERSION, SessionV0, SessionV1, SettingsV0, SettingsV1,
    VideoV0, VideoV1,
};
