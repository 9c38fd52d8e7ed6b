// # Static Desired State
//
// In-memory implementation of DesiredState.
//
// ## Purpose
//
// Holds declared records handed over by an embedding program that already
// parsed and normalized its own configuration. Also the natural choice for
// tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::names;
use crate::record::Record;
use crate::traits::desired_state::DesiredState;

/// In-memory desired state
///
/// Zones are keyed by name without trailing dot, so `example.com` and
/// `example.com.` address the same entry.
///
/// # Example
///
/// ```rust,no_run
/// use zonesync_core::record::Record;
/// use zonesync_core::source::StaticDesiredState;
/// use zonesync_core::traits::DesiredState;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = StaticDesiredState::new();
///     source
///         .set_zone("example.com", vec![Record::new("www.example.com", "A", "192.0.2.1", 300)])
///         .await;
///
///     let records = source.records("example.com.").await?;
///     assert_eq!(records.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticDesiredState {
    zones: Arc<RwLock<HashMap<String, Vec<Record>>>>,
}

impl StaticDesiredState {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding one zone
    pub fn with_zone(zone: &str, records: Vec<Record>) -> Self {
        let mut zones = HashMap::new();
        zones.insert(zone_key(zone), normalized(records));
        Self {
            zones: Arc::new(RwLock::new(zones)),
        }
    }

    /// Replace the declared records of a zone
    pub async fn set_zone(&self, zone: &str, records: Vec<Record>) {
        let mut guard = self.zones.write().await;
        guard.insert(zone_key(zone), normalized(records));
    }

    /// Forget a zone
    pub async fn remove_zone(&self, zone: &str) {
        let mut guard = self.zones.write().await;
        guard.remove(&zone_key(zone));
    }

    /// Number of zones held
    pub async fn len(&self) -> usize {
        self.zones.read().await.len()
    }

    /// Check if no zone is held
    pub async fn is_empty(&self) -> bool {
        self.zones.read().await.is_empty()
    }
}

#[async_trait]
impl DesiredState for StaticDesiredState {
    async fn records(&self, zone: &str) -> Result<Vec<Record>, Error> {
        let guard = self.zones.read().await;
        guard
            .get(&zone_key(zone))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no desired records declared for zone {}", zone)))
    }
}

fn zone_key(zone: &str) -> String {
    names::strip_fqdn(zone).to_string()
}

fn normalized(mut records: Vec<Record>) -> Vec<Record> {
    records.iter_mut().for_each(Record::normalize_name);
    records
}
