// # Corrections
//
// A correction is one planned record-set mutation: a human-readable
// description plus an inspectable request value. Nothing here performs I/O
// until [`Correction::execute`] hands the request to a backend.
//
// ## Record-set grouping
//
// Backends replace or delete whole record-sets. Every `(name, type)` touched
// by the differ therefore becomes exactly one correction:
//
// ```text
//   no desired records left for the set  -> DELETE  (kind: delete)
//   no current records for the set       -> REPLACE (kind: create)
//   otherwise                            -> REPLACE (kind: modify)
// ```
//
// A REPLACE always carries every desired record of the set, including the
// unchanged ones, so sibling values are never clobbered.
//
// Corrections are ordered deletes, then modifies, then creates. Within a
// kind, sets appear in the order the differ first touched them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::diff::{ChangeKind, Changes, Correlation};
use crate::error::Result;
use crate::names;
use crate::record::Record;
use crate::traits::DnsBackend;
use crate::zone::RecordEntry;

/// Wire-level instruction for a record-set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    /// Set the record-set's content wholesale
    Replace,
    /// Remove the record-set
    Delete,
}

/// Record-set mutation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSetChange {
    /// Absolute owner name (trailing dot)
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub rtype: String,
    /// TTL for the set; omitted on delete
    pub ttl: Option<u32>,
    /// REPLACE or DELETE
    pub changetype: ChangeType,
    /// Record values
    pub records: Vec<RecordEntry>,
    /// Comments for the set; empty leaves backend comments untouched
    #[serde(default)]
    pub comments: Vec<String>,
}

/// One planned, self-contained change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Create, modify or delete
    pub kind: ChangeKind,
    /// Stable human-readable summary, one line per record difference
    pub description: String,
    /// Zone identifier the request targets
    pub zone_id: String,
    /// Mutation request
    pub change: RecordSetChange,
}

impl Correction {
    /// Apply the correction through `backend`
    ///
    /// Calls [`DnsBackend::apply_change`] exactly once and returns its error
    /// unchanged.
    pub async fn execute(&self, backend: &dyn DnsBackend) -> Result<()> {
        backend.apply_change(&self.zone_id, &self.change).await
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// All records and correlations of one touched record-set
#[derive(Debug)]
struct SetGroup<'a> {
    name: &'a str,
    rtype: &'a str,
    correlations: Vec<&'a Correlation>,
}

/// Turns differ output into ordered corrections for one zone
#[derive(Debug, Clone)]
pub struct CorrectionBuilder {
    zone_id: String,
    zone_name: String,
    default_ttl: u32,
}

impl CorrectionBuilder {
    /// Create a builder
    ///
    /// # Parameters
    ///
    /// - `zone_id`: backend identifier used by the mutation request
    /// - `zone_name`: zone origin names are anchored against
    /// - `default_ttl`: TTL for REPLACE payloads when nothing else supplies one
    pub fn new(zone_id: impl Into<String>, zone_name: impl Into<String>, default_ttl: u32) -> Self {
        Self {
            zone_id: zone_id.into(),
            zone_name: names::strip_fqdn(&zone_name.into()).to_string(),
            default_ttl,
        }
    }

    /// Build every correction needed to go from `current` to `desired`
    ///
    /// `changes` must be the output of [`crate::diff::diff`] for the same
    /// inputs.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Reconciliation`] if any touched name is outside the
    /// zone. No partial list is returned.
    pub fn build_all(
        &self,
        changes: &Changes,
        desired: &[Record],
        current: &[Record],
    ) -> Result<Vec<Correction>> {
        let mut order: Vec<(&str, &str)> = Vec::new();
        let mut groups: HashMap<(&str, &str), SetGroup<'_>> = HashMap::new();

        let touched = changes
            .delete
            .iter()
            .chain(changes.modify.iter())
            .chain(changes.create.iter());

        for correlation in touched {
            let Some((name, rtype)) = correlation.set_key() else {
                continue;
            };
            groups
                .entry((name, rtype))
                .or_insert_with(|| {
                    order.push((name, rtype));
                    SetGroup {
                        name,
                        rtype,
                        correlations: Vec::new(),
                    }
                })
                .correlations
                .push(correlation);
        }

        let mut corrections = Vec::with_capacity(order.len());
        for key in order {
            let group = &groups[&key];
            let wanted: Vec<&Record> = desired.iter().filter(|r| r.set_key() == key).collect();
            let held: Vec<&Record> = current.iter().filter(|r| r.set_key() == key).collect();

            let kind = if wanted.is_empty() {
                ChangeKind::Delete
            } else if held.is_empty() {
                ChangeKind::Create
            } else {
                ChangeKind::Modify
            };

            corrections.push(self.build(kind, group, &wanted, &held)?);
        }

        // Stable: keeps first-touched order within each kind
        corrections.sort_by_key(|correction| correction.kind);
        Ok(corrections)
    }

    /// Build the correction for one record-set
    fn build(
        &self,
        kind: ChangeKind,
        group: &SetGroup<'_>,
        wanted: &[&Record],
        held: &[&Record],
    ) -> Result<Correction> {
        let label = names::relativize(group.name, &self.zone_name)?;
        let name = names::absolutize(&label, &self.zone_name);

        let change = match kind {
            ChangeKind::Create | ChangeKind::Modify => RecordSetChange {
                name,
                rtype: group.rtype.to_string(),
                ttl: Some(self.replace_ttl(group, wanted, held)),
                changetype: ChangeType::Replace,
                records: wanted
                    .iter()
                    .map(|record| RecordEntry {
                        content: record.target.clone(),
                        disabled: record.metadata.disabled,
                    })
                    .collect(),
                comments: collect_comments(wanted),
            },
            ChangeKind::Delete => RecordSetChange {
                name,
                rtype: group.rtype.to_string(),
                ttl: None,
                changetype: ChangeType::Delete,
                records: held
                    .iter()
                    .map(|record| RecordEntry::new(record.target.clone()))
                    .collect(),
                comments: Vec::new(),
            },
        };

        let description = group
            .correlations
            .iter()
            .map(|correlation| correlation.to_string())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Correction {
            kind,
            description,
            zone_id: self.zone_id.clone(),
            change,
        })
    }

    /// TTL for a REPLACE: first non-zero desired TTL, then the current set
    /// TTL, then the default
    fn replace_ttl(&self, group: &SetGroup<'_>, wanted: &[&Record], held: &[&Record]) -> u32 {
        let mut ttls = wanted.iter().map(|r| r.ttl).filter(|ttl| *ttl != 0);
        let Some(ttl) = ttls.next() else {
            return held
                .iter()
                .map(|r| r.ttl)
                .find(|ttl| *ttl != 0)
                .unwrap_or(self.default_ttl);
        };

        if ttls.any(|other| other != ttl) {
            tracing::warn!(
                "Record-set {} {} declares differing TTLs, using {}",
                group.name,
                group.rtype,
                ttl
            );
        }
        ttl
    }
}

/// Distinct comments declared on the desired records of a set
fn collect_comments(wanted: &[&Record]) -> Vec<String> {
    let mut comments: Vec<String> = Vec::new();
    for comment in wanted.iter().filter_map(|r| r.metadata.comment.as_ref()) {
        if !comments.contains(comment) {
            comments.push(comment.clone());
        }
    }
    comments
}
