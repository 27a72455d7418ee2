//! Schema step contract.

use reelsmith_core::Result;
use semver::Version;

/// Upgrades a record of one schema version into the next schema.
pub trait Migration<From, To> {
    /// Schema version of the records this step reads.
    fn source_version(&self) -> Version;

    /// # Errors
    ///
    /// `ReelError::Deserialization` when `record` cannot be expressed in `To`.
    fn migrate(&self, record: From) -> Result<To>;

    fn can_migrate(&self, version: &Version) -> bool {
        *version == self.source_version()
    }
}
