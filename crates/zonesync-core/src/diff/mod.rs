//! Three-way classification of desired vs current records
//!
//! Records are correlated by `(name, type, target)`:
//!
//! ```text
//!   key only in desired            -> create
//!   key only in current            -> delete
//!   key in both, content differs   -> modify  (existing + desired)
//!   key in both, content matches   -> unchanged
//! ```
//!
//! Output order follows input traversal: `desired` order for create,
//! modify and unchanged; `current` order for delete. Nothing is re-sorted.
//!
//! Both inputs are assumed free of exact-key duplicates. Use
//! [`find_duplicate`] to reject such input before diffing, and
//! [`find_set_conflict`] to reject sets whose records disagree on TTL or
//! comment.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::record::{Record, RecordKey};

/// Kind of change a correlation or correction represents
///
/// Variants are ordered the way corrections are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Remove records absent from the desired state
    Delete,
    /// Update records whose content differs
    Modify,
    /// Add records missing at the backend
    Create,
}

impl ChangeKind {
    /// Upper-case verb used in descriptions
    pub fn verb(&self) -> &'static str {
        match self {
            ChangeKind::Create => "CREATE",
            ChangeKind::Modify => "MODIFY",
            ChangeKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// A paired or single-sided record difference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    /// Record currently held by the backend
    pub existing: Option<Record>,
    /// Record declared in the desired state
    pub desired: Option<Record>,
}

impl Correlation {
    /// Correlation for a record to create
    pub fn create(desired: Record) -> Self {
        Self {
            existing: None,
            desired: Some(desired),
        }
    }

    /// Correlation for a record to delete
    pub fn delete(existing: Record) -> Self {
        Self {
            existing: Some(existing),
            desired: None,
        }
    }

    /// Correlation for a record present on both sides
    pub fn pair(existing: Record, desired: Record) -> Self {
        Self {
            existing: Some(existing),
            desired: Some(desired),
        }
    }

    /// The record this correlation is about (desired side preferred)
    ///
    /// Correlations built by [`diff`] always have at least one side.
    pub fn record(&self) -> Option<&Record> {
        self.desired.as_ref().or(self.existing.as_ref())
    }

    /// `(name, type)` of the record-set this correlation touches
    pub fn set_key(&self) -> Option<(&str, &str)> {
        self.record().map(Record::set_key)
    }
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.existing, &self.desired) {
            (None, Some(desired)) => write!(f, "{} {}", ChangeKind::Create, desired),
            (Some(existing), None) => write!(f, "{} {}", ChangeKind::Delete, existing),
            (Some(existing), Some(desired)) => {
                // Comments only matter when the desired record declares one
                let show_comment = desired.metadata.comment.is_some()
                    && desired.metadata.comment != existing.metadata.comment;
                write!(
                    f,
                    "{} {} {}: ({}) -> ({})",
                    ChangeKind::Modify,
                    desired.rtype,
                    desired.name,
                    ModifySide(existing, show_comment),
                    ModifySide(desired, show_comment),
                )
            }
            (None, None) => f.write_str("NOOP"),
        }
    }
}

/// One side of a MODIFY description: target, TTL and any metadata that differs
struct ModifySide<'a>(&'a Record, bool);

impl fmt::Display for ModifySide<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ModifySide(record, show_comment) = self;
        write!(f, "{} ttl={}", record.target, record.ttl)?;
        if record.metadata.disabled {
            f.write_str(" disabled")?;
        }
        if *show_comment {
            match &record.metadata.comment {
                Some(comment) => write!(f, " comment={:?}", comment)?,
                None => f.write_str(" no comment")?,
            }
        }
        Ok(())
    }
}

/// Differ output buckets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    /// Keys on both sides with matching content
    pub unchanged: Vec<Correlation>,
    /// Keys only in desired
    pub create: Vec<Correlation>,
    /// Keys only in current
    pub delete: Vec<Correlation>,
    /// Keys on both sides with differing content
    pub modify: Vec<Correlation>,
}

impl Changes {
    /// Whether no create, delete or modify is needed
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.delete.is_empty() && self.modify.is_empty()
    }

    /// Number of create, delete and modify correlations
    pub fn len(&self) -> usize {
        self.create.len() + self.delete.len() + self.modify.len()
    }
}

/// Compute the classified changes between `desired` and `current`
pub fn diff(desired: &[Record], current: &[Record]) -> Changes {
    let current_index: HashMap<RecordKey<'_>, &Record> =
        current.iter().map(|record| (record.key(), record)).collect();
    let desired_keys: HashSet<RecordKey<'_>> = desired.iter().map(Record::key).collect();

    let mut changes = Changes::default();

    for wanted in desired {
        match current_index.get(&wanted.key()) {
            Some(existing) if wanted.content_matches(existing) => {
                changes
                    .unchanged
                    .push(Correlation::pair((*existing).clone(), wanted.clone()));
            }
            Some(existing) => {
                changes
                    .modify
                    .push(Correlation::pair((*existing).clone(), wanted.clone()));
            }
            None => changes.create.push(Correlation::create(wanted.clone())),
        }
    }

    for existing in current {
        if !desired_keys.contains(&existing.key()) {
            changes.delete.push(Correlation::delete(existing.clone()));
        }
    }

    tracing::debug!(
        unchanged = changes.unchanged.len(),
        create = changes.create.len(),
        delete = changes.delete.len(),
        modify = changes.modify.len(),
        "Computed record diff"
    );

    changes
}

/// Return the first record whose key already appeared earlier in `records`
pub fn find_duplicate(records: &[Record]) -> Option<&Record> {
    let mut seen = HashSet::with_capacity(records.len());
    records.iter().find(|record| !seen.insert(record.key()))
}

/// Describe the first record-set whose records disagree on a set-level field
///
/// A backend stores one TTL and one comment list per `(name, type)`.
/// Desired records of one set that declare different non-zero TTLs, or
/// different comments, can never all match what is stored.
pub fn find_set_conflict(records: &[Record]) -> Option<String> {
    let mut ttls: HashMap<(&str, &str), u32> = HashMap::new();
    let mut comments: HashMap<(&str, &str), &str> = HashMap::new();

    for record in records {
        let (name, rtype) = record.set_key();

        if record.ttl != 0 {
            let ttl = *ttls.entry((name, rtype)).or_insert(record.ttl);
            if ttl != record.ttl {
                return Some(format!(
                    "record-set {} {} declares differing TTLs {} and {}",
                    rtype, name, ttl, record.ttl
                ));
            }
        }

        if let Some(comment) = record.metadata.comment.as_deref() {
            let first = *comments.entry((name, rtype)).or_insert(comment);
            if first != comment {
                return Some(format!(
                    "record-set {} {} declares differing comments {:?} and {:?}",
                    rtype, name, first, comment
                ));
            }
        }
    }

    None
}
