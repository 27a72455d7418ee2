//! Schema migration for the session document.
//!
//! Each session record is decoded on its own, dispatching on its
//! `schema_version` marker:
//!
//! ```text
//!   (no marker)  ──SessionV0ToV1──▶  1.0.0  ──▶  Session
//!   1.0.0        ─────────────────────────────▶  Session
//!   > 1.0.0      ──▶  rejected (written by a newer build)
//! ```
//!
//! When a 1.x → 2.0.0 change lands, add the migration next to
//! `SessionV0ToV1Migration` and extend [`decode_session`] with the new arm.

mod session;
mod traits;

pub use session::{LEGACY_SESSION_VERSION, SessionV0ToV1Migration};
pub use traits::Migration;

use crate::dto::{SESSION_V1_VERSION, SessionV0, SessionV1};
use reelsmith_core::session::Session;
use reelsmith_core::{ReelError, Result};
use semver::Version;
use serde_json::Value;

const SCHEMA_VERSION_FIELD: &str = "schema_version";

/// Reads the schema version of a raw record.
///
/// Records without a marker are legacy (`0.0.0`).
pub fn record_version(record: &Value) -> Result<Version> {
    match record.get(SCHEMA_VERSION_FIELD) {
        None | Some(Value::Null) => Ok(Version::new(0, 0, 0)),
        Some(Value::String(raw)) => Version::parse(raw).map_err(|e| {
            ReelError::deserialization("JSON", format!("Invalid schema_version '{raw}': {e}"))
        }),
        Some(other) => Err(ReelError::deserialization(
            "JSON",
            format!("schema_version must be a string, got {other}"),
        )),
    }
}

/// Decodes one raw session record, migrating it to the current schema.
pub fn decode_session(record: Value) -> Result<Session> {
    let version = record_version(&record)?;
    let latest = Version::parse(SESSION_V1_VERSION)
        .map_err(|e| ReelError::internal(format!("Invalid built-in schema version: {e}")))?;

    if version > latest {
        return Err(ReelError::deserialization(
            "JSON",
            format!("Unsupported session schema version {version} (latest supported is {latest})"),
        ));
    }

    let dto = if version == latest {
        serde_json::from_value::<SessionV1>(record)?
    } else {
        let migration = SessionV0ToV1Migration;
        if !migration.can_migrate(&version) {
            return Err(ReelError::deserialization(
                "JSON",
                format!("No migration path from session schema version {version}"),
            ));
        }
        let legacy = serde_json::from_value::<SessionV0>(record)?;
        migration.migrate(legacy)?
    };

    Ok(Session::from(dto))
}

/// Encodes a session as a current-schema record.
pub fn encode_session(session: &Session) -> Result<Value> {
    Ok(serde_json::to_value(SessionV1::from(session))?)
}
