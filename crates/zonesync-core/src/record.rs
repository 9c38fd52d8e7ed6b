//! Canonical DNS record model
//!
//! A [`Record`] is one resource record, used for both desired and current
//! state. Records are built fresh on every reconciliation pass and never
//! mutated in place.
//!
//! Identity for diffing is the tuple `(name, type, target)`. TTL and
//! metadata are compared separately by [`Record::content_matches`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::names;

/// Borrowed correlation key: `(name, type, target)`
pub type RecordKey<'a> = (&'a str, &'a str, &'a str);

/// Non-key record metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Whether the record is disabled at the backend
    #[serde(default)]
    pub disabled: bool,

    /// Free-form comment attached to the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One DNS resource record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Fully-qualified name without trailing dot (e.g. "www.example.com")
    pub name: String,

    /// Record type token, compared exactly (e.g. "A", "CNAME")
    #[serde(rename = "type")]
    pub rtype: String,

    /// Time-to-live in seconds; 0 means unset
    #[serde(default)]
    pub ttl: u32,

    /// Record value, compared verbatim
    pub target: String,

    /// Disabled flag and comment
    #[serde(default)]
    pub metadata: RecordMetadata,
}

impl Record {
    /// Create a new record
    ///
    /// A trailing dot on `name` is removed.
    pub fn new(
        name: impl Into<String>,
        rtype: impl Into<String>,
        target: impl Into<String>,
        ttl: u32,
    ) -> Self {
        let mut record = Self {
            name: name.into(),
            rtype: rtype.into(),
            ttl,
            target: target.into(),
            metadata: RecordMetadata::default(),
        };
        record.normalize_name();
        record
    }

    /// Mark the record disabled or enabled
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.metadata.disabled = disabled;
        self
    }

    /// Attach a comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.metadata.comment = Some(comment.into());
        self
    }

    /// Remove a trailing dot from the name
    pub fn normalize_name(&mut self) {
        if self.name.ends_with('.') {
            self.name = names::strip_fqdn(&self.name).to_string();
        }
    }

    /// Correlation key used by the differ
    pub fn key(&self) -> RecordKey<'_> {
        (&self.name, &self.rtype, &self.target)
    }

    /// Record-set key: `(name, type)`
    pub fn set_key(&self) -> (&str, &str) {
        (&self.name, &self.rtype)
    }

    /// Compare the non-key fields of two records with the same key
    ///
    /// `self` is the desired record, `current` the one held by the backend.
    /// A TTL of 0 on either side is unset and always matches. A comment is
    /// only compared when the desired record carries one.
    pub fn content_matches(&self, current: &Record) -> bool {
        let ttl_matches = self.ttl == 0 || current.ttl == 0 || self.ttl == current.ttl;
        let comment_matches = match &self.metadata.comment {
            Some(comment) => current.metadata.comment.as_ref() == Some(comment),
            None => true,
        };

        ttl_matches && comment_matches && self.metadata.disabled == current.metadata.disabled
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} ttl={}", self.rtype, self.name, self.target, self.ttl)?;
        if self.metadata.disabled {
            write!(f, " disabled")?;
        }
        Ok(())
    }
}
