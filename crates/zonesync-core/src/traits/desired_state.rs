// # Desired State Trait
//
// Defines the interface to whatever supplies the declared records of a zone.
//
// ## Contract
//
// Implementations return records that are already validated and
// normalized: names without trailing dot, exactly one entry per
// `(name, type, target)`. The engine still rejects duplicates before
// diffing.
//
// ## Implementations
//
// - In-memory: [`crate::source::StaticDesiredState`]
// - JSON file: [`crate::source::FileDesiredState`]

use async_trait::async_trait;

use crate::record::Record;

/// Trait for desired-state providers
#[async_trait]
pub trait DesiredState: Send + Sync {
    /// Declared records for `zone`
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Record>)`: the declared records (may be empty)
    /// - `Err(Error::NotFound)`: the source has no entry for the zone
    async fn records(&self, zone: &str) -> Result<Vec<Record>, crate::Error>;
}
