//! Backend-neutral zone model
//!
//! Backends group records into record-sets (one TTL per `(name, type)`).
//! [`Zone::flatten`] turns that grouping into canonical [`Record`]s, one per
//! `(name, type, target)`, copying the set TTL onto each.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::names;
use crate::record::{Record, RecordMetadata};

/// Summary entry returned when listing zones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSummary {
    /// Backend identifier used in API paths
    pub id: String,
    /// Absolute zone name (e.g. "example.com.")
    pub name: String,
    /// Zone kind (e.g. "Native", "Master")
    #[serde(default)]
    pub kind: String,
}

/// One record value inside a record-set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Record content
    pub content: String,
    /// Whether the record is disabled
    #[serde(default)]
    pub disabled: bool,
}

impl RecordEntry {
    /// Create an enabled entry
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            disabled: false,
        }
    }
}

/// Records sharing one `(name, type)` and one TTL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Absolute owner name (e.g. "www.example.com.")
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub rtype: String,
    /// TTL shared by the set
    pub ttl: u32,
    /// Record values, in backend order
    pub records: Vec<RecordEntry>,
    /// Comments attached to the set
    #[serde(default)]
    pub comments: Vec<String>,
}

/// A zone and its record-sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Backend identifier used in API paths
    pub id: String,
    /// Absolute zone name
    pub name: String,
    /// Zone kind
    #[serde(default)]
    pub kind: String,
    /// Record-sets in backend order
    #[serde(default)]
    pub record_sets: Vec<RecordSet>,
}

impl Zone {
    /// Zone name without trailing dot
    pub fn origin(&self) -> &str {
        names::strip_fqdn(&self.name)
    }

    /// Flatten record-sets into canonical records
    ///
    /// Preserves record-set order and, within a set, record order.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Reconciliation`] if a record-set name is not within
    /// the zone.
    pub fn flatten(&self) -> Result<Vec<Record>> {
        let origin = self.origin();
        let mut records = Vec::new();

        for set in &self.record_sets {
            // Rejects names outside the zone
            names::relativize(&set.name, origin)?;

            let comment = set.comments.first().cloned();
            for entry in &set.records {
                records.push(Record {
                    name: names::strip_fqdn(&set.name).to_string(),
                    rtype: set.rtype.clone(),
                    ttl: set.ttl,
                    target: entry.content.clone(),
                    metadata: RecordMetadata {
                        disabled: entry.disabled,
                        comment: comment.clone(),
                    },
                });
            }
        }

        Ok(records)
    }

    /// Contents of the apex NS record-set
    pub fn nameservers(&self) -> Vec<String> {
        let origin = self.origin();
        self.record_sets
            .iter()
            .filter(|set| set.rtype == "NS" && names::strip_fqdn(&set.name) == origin)
            .flat_map(|set| set.records.iter().map(|entry| entry.content.clone()))
            .collect()
    }
}
