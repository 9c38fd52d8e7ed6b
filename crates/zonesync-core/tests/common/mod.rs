//! Test doubles and common utilities for reconciliation contract tests
//!
//! The in-memory backend mimics the record-set semantics of an
//! authoritative server API: REPLACE sets a `(name, type)` wholesale,
//! DELETE removes it. It records every call so tests can assert on
//! ordering and on what was never attempted.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use zonesync_core::error::{Error, Result};
use zonesync_core::{
    ChangeType, DnsBackend, EngineConfig, Record, RecordEntry, RecordSet, RecordSetChange,
    Reconciler, Zone, ZoneSummary,
};

/// Zone identifier used throughout the tests
pub const ZONE: &str = "example.com.";

/// In-memory backend with record-set replace/delete semantics
pub struct InMemoryBackend {
    /// Zones keyed by identifier
    zones: Arc<Mutex<HashMap<String, Zone>>>,
    /// Every apply_change call, in order
    applied: Arc<Mutex<Vec<(String, RecordSetChange)>>>,
    /// Call counter for fetch_zone()
    fetch_call_count: Arc<AtomicUsize>,
    /// Zero-based apply_change call that fails with HTTP 422
    fail_on_apply: Arc<Mutex<Option<usize>>>,
}

impl InMemoryBackend {
    /// Create a backend holding no zones
    pub fn new() -> Self {
        Self {
            zones: Arc::new(Mutex::new(HashMap::new())),
            applied: Arc::new(Mutex::new(Vec::new())),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
            fail_on_apply: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a backend holding one zone with the given records
    pub fn with_records(records: &[Record]) -> Self {
        let backend = Self::new();
        backend.insert_zone(zone_from_records(ZONE, records));
        backend
    }

    /// Create a backend that shares all state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            zones: Arc::clone(&other.zones),
            applied: Arc::clone(&other.applied),
            fetch_call_count: Arc::clone(&other.fetch_call_count),
            fail_on_apply: Arc::clone(&other.fail_on_apply),
        }
    }

    /// Add or replace a zone
    pub fn insert_zone(&self, zone: Zone) {
        self.zones.lock().unwrap().insert(zone.id.clone(), zone);
    }

    /// Make the n-th (zero-based) apply_change call fail
    pub fn fail_on_apply(&self, call: usize) {
        *self.fail_on_apply.lock().unwrap() = Some(call);
    }

    /// Every apply_change call, in order
    pub fn applied(&self) -> Vec<(String, RecordSetChange)> {
        self.applied.lock().unwrap().clone()
    }

    /// Number of apply_change calls (including failed ones)
    pub fn apply_call_count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    /// Number of fetch_zone calls
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    /// Current records of the test zone, flattened
    pub fn current_records(&self) -> Vec<Record> {
        self.zones.lock().unwrap()[ZONE].flatten().unwrap()
    }
}

#[async_trait::async_trait]
impl DnsBackend for InMemoryBackend {
    async fn list_zones(&self) -> Result<Vec<ZoneSummary>> {
        let zones = self.zones.lock().unwrap();
        Ok(zones
            .values()
            .map(|zone| ZoneSummary {
                id: zone.id.clone(),
                name: zone.name.clone(),
                kind: zone.kind.clone(),
            })
            .collect())
    }

    async fn fetch_zone(&self, zone_id: &str) -> Result<Zone> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        self.zones
            .lock()
            .unwrap()
            .get(zone_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("zone {} does not exist", zone_id)))
    }

    async fn apply_change(&self, zone_id: &str, change: &RecordSetChange) -> Result<()> {
        let call = {
            let mut applied = self.applied.lock().unwrap();
            applied.push((zone_id.to_string(), change.clone()));
            applied.len() - 1
        };

        if *self.fail_on_apply.lock().unwrap() == Some(call) {
            return Err(Error::status(422, "422 Unprocessable Entity"));
        }

        let mut zones = self.zones.lock().unwrap();
        let zone = zones
            .get_mut(zone_id)
            .ok_or_else(|| Error::not_found(format!("zone {} does not exist", zone_id)))?;

        let position = zone
            .record_sets
            .iter()
            .position(|set| set.name == change.name && set.rtype == change.rtype);

        match change.changetype {
            ChangeType::Replace => {
                let set = RecordSet {
                    name: change.name.clone(),
                    rtype: change.rtype.clone(),
                    ttl: change.ttl.unwrap_or_default(),
                    records: change.records.clone(),
                    comments: change.comments.clone(),
                };
                match position {
                    Some(index) => zone.record_sets[index] = set,
                    None => zone.record_sets.push(set),
                }
            }
            ChangeType::Delete => {
                if let Some(index) = position {
                    zone.record_sets.remove(index);
                }
            }
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}

/// Build a zone by grouping records into record-sets
pub fn zone_from_records(zone_id: &str, records: &[Record]) -> Zone {
    let mut record_sets: Vec<RecordSet> = Vec::new();
    for record in records {
        let name = format!("{}.", record.name);
        match record_sets
            .iter_mut()
            .find(|set| set.name == name && set.rtype == record.rtype)
        {
            Some(set) => set.records.push(RecordEntry {
                content: record.target.clone(),
                disabled: record.metadata.disabled,
            }),
            None => record_sets.push(RecordSet {
                name,
                rtype: record.rtype.clone(),
                ttl: record.ttl,
                records: vec![RecordEntry {
                    content: record.target.clone(),
                    disabled: record.metadata.disabled,
                }],
                comments: Vec::new(),
            }),
        }
    }

    Zone {
        id: zone_id.to_string(),
        name: zone_id.to_string(),
        kind: "Native".to_string(),
        record_sets,
    }
}

/// Shorthand record constructor
pub fn rec(name: &str, rtype: &str, target: &str, ttl: u32) -> Record {
    Record::new(name, rtype, target, ttl)
}

/// Engine settings for tests
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        dry_run: false,
        stop_on_first_failure: true,
        default_ttl: 300,
        event_channel_capacity: 100,
    }
}

/// Reconciler over a backend that shares state with `backend`
pub fn reconciler_for(
    backend: &InMemoryBackend,
    config: EngineConfig,
) -> (Reconciler, tokio::sync::mpsc::Receiver<zonesync_core::EngineEvent>) {
    Reconciler::new(Box::new(InMemoryBackend::sharing_state_with(backend)), config)
        .expect("reconciler construction succeeds")
}

/// Compared fields of a record set, sorted for order-insensitive equality
pub fn compared_fields(records: &[Record]) -> Vec<(String, String, String, u32)> {
    let mut fields: Vec<_> = records
        .iter()
        .map(|r| (r.name.clone(), r.rtype.clone(), r.target.clone(), r.ttl))
        .collect();
    fields.sort();
    fields
}
