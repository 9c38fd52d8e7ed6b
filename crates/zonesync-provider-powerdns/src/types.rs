//! PowerDNS HTTP API wire types
//!
//! Field names follow the API's JSON. Empty fields are omitted on the wire
//! so a PATCH never sends keys the server would interpret.

use serde::{Deserialize, Serialize};
use zonesync_core::{ChangeType, RecordEntry, RecordSet, RecordSetChange, Zone, ZoneSummary};

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Comment attached to an rrset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsComment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub modified_at: u64,
}

/// One record inside an rrset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsRecord {
    pub content: String,
    #[serde(default)]
    pub disabled: bool,
    /// Always sent as false; PTR side effects are not managed here
    #[serde(rename = "set-ptr", default)]
    pub set_ptr: bool,
}

/// Resource record set, as returned by GET and sent by PATCH
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsRRSet {
    /// Absolute name (trailing dot)
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Only present in PATCH bodies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changetype: Option<ChangeType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<PdnsRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<PdnsComment>,
}

/// Zone object
///
/// `GET /zones` returns these without `rrsets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsZone {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<u64>,
    #[serde(default)]
    pub dnssec: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rrsets: Vec<PdnsRRSet>,
}

/// PATCH body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RRSetsUpdate {
    pub rrsets: Vec<PdnsRRSet>,
}

impl From<&RecordSetChange> for PdnsRRSet {
    fn from(change: &RecordSetChange) -> Self {
        // DELETE only needs name and type; the server ignores anything else
        let ttl = match change.changetype {
            ChangeType::Replace => change.ttl,
            ChangeType::Delete => None,
        };

        Self {
            name: change.name.clone(),
            rtype: change.rtype.clone(),
            ttl,
            changetype: Some(change.changetype),
            records: change
                .records
                .iter()
                .map(|entry| PdnsRecord {
                    content: entry.content.clone(),
                    disabled: entry.disabled,
                    set_ptr: false,
                })
                .collect(),
            comments: change
                .comments
                .iter()
                .map(|content| PdnsComment {
                    content: content.clone(),
                    ..PdnsComment::default()
                })
                .collect(),
        }
    }
}

impl From<PdnsRRSet> for RecordSet {
    fn from(rrset: PdnsRRSet) -> Self {
        Self {
            name: rrset.name,
            rtype: rrset.rtype,
            ttl: rrset.ttl.unwrap_or_default(),
            records: rrset
                .records
                .into_iter()
                .map(|record| RecordEntry {
                    content: record.content,
                    disabled: record.disabled,
                })
                .collect(),
            comments: rrset
                .comments
                .into_iter()
                .map(|comment| comment.content)
                .filter(|content| !content.is_empty())
                .collect(),
        }
    }
}

impl From<PdnsZone> for Zone {
    fn from(zone: PdnsZone) -> Self {
        Self {
            id: zone.id,
            name: zone.name,
            kind: zone.kind,
            record_sets: zone.rrsets.into_iter().map(RecordSet::from).collect(),
        }
    }
}

impl From<&PdnsZone> for ZoneSummary {
    fn from(zone: &PdnsZone) -> Self {
        Self {
            id: zone.id.clone(),
            name: zone.name.clone(),
            kind: zone.kind.clone(),
        }
    }
}
