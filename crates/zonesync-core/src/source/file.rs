// # File Desired State
//
// JSON-file implementation of DesiredState.
//
// ## Purpose
//
// Lets the runner reconcile zones declared in a file produced by an
// external normalizer. The file is read on every call so each
// reconciliation pass sees the latest declaration.
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "zones": {
//     "example.com": [
//       { "name": "www.example.com", "type": "A", "target": "192.0.2.1", "ttl": 300 }
//     ]
//   }
// }
// ```
//
// A zone missing from the file is an error rather than an empty desired
// set, so a typo never plans the deletion of a whole zone.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::names;
use crate::record::Record;
use crate::traits::desired_state::DesiredState;

/// Desired-state file format version
const DESIRED_FILE_VERSION: &str = "1.0";

/// Serializable desired-state file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DesiredFileFormat {
    /// Format version
    pub version: String,
    /// Records per zone
    pub zones: HashMap<String, Vec<Record>>,
}

impl DesiredFileFormat {
    /// Create an empty document at the current version
    pub fn new() -> Self {
        Self {
            version: DESIRED_FILE_VERSION.to_string(),
            zones: HashMap::new(),
        }
    }
}

impl Default for DesiredFileFormat {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON-file desired state
#[derive(Debug, Clone)]
pub struct FileDesiredState {
    path: PathBuf,
}

impl FileDesiredState {
    /// Create a source reading from `path`
    ///
    /// The file is not touched until [`DesiredState::records`] is called.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the whole file
    pub async fn load(&self) -> Result<DesiredFileFormat, Error> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read desired-state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let document: DesiredFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::invalid_input(format!(
                "Failed to parse desired-state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if document.version != DESIRED_FILE_VERSION {
            tracing::warn!(
                "Desired-state file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                DESIRED_FILE_VERSION,
                document.version
            );
        }

        Ok(document)
    }
}

#[async_trait]
impl DesiredState for FileDesiredState {
    async fn records(&self, zone: &str) -> Result<Vec<Record>, Error> {
        let mut document = self.load().await?;
        let wanted = names::strip_fqdn(zone);

        let key = document
            .zones
            .keys()
            .find(|candidate| names::strip_fqdn(candidate) == wanted)
            .cloned()
            .ok_or_else(|| {
                Error::not_found(format!(
                    "zone {} is not declared in {}",
                    zone,
                    self.path.display()
                ))
            })?;

        let mut records = document.zones.remove(&key).unwrap_or_default();
        records.iter_mut().for_each(Record::normalize_name);

        tracing::debug!(
            "Loaded {} desired record(s) for {} from {}",
            records.len(),
            zone,
            self.path.display()
        );
        Ok(records)
    }
}
