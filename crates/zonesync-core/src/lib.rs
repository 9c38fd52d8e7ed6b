// # zonesync-core
//
// Core library for reconciling declared DNS zones against a live server.
//
// ## Architecture Overview
//
// This library provides the backend-neutral reconciliation engine:
// - **Record / Zone**: canonical records and the grouped zone model backends return
// - **diff**: classifies desired vs current records into create / delete / modify
// - **CorrectionBuilder**: turns classified changes into ordered record-set corrections
// - **DnsBackend**: trait for fetching zones and applying record-set changes
// - **DesiredState**: trait for whatever supplies the declared records
// - **Reconciler**: orchestrates fetch → diff → build → apply
// - **BackendRegistry**: plugin-based registry for DNS backends
//
// ## Design Principles
//
// 1. **Separation of Concerns**: diffing is pure; only backends perform I/O
// 2. **Inspectable Plans**: a correction is data, printable without executing it
// 3. **Record-set Granularity**: one correction per touched `(name, type)`
// 4. **Fail-fast**: no retries, no rollback; the next pass converges
// 5. **Idempotency**: a converged zone plans zero corrections

pub mod config;
pub mod correction;
pub mod diff;
pub mod engine;
pub mod error;
pub mod names;
pub mod record;
pub mod registry;
pub mod source;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use config::{BackendConfig, EngineConfig, SyncConfig, ZoneConfig};
pub use correction::{ChangeType, Correction, CorrectionBuilder, RecordSetChange};
pub use diff::{ChangeKind, Changes, Correlation, diff};
pub use engine::{ApplyReport, CorrectionOutcome, EngineEvent, OutcomeStatus, Plan, Reconciler, SkipReason};
pub use error::{Error, Result};
pub use record::{Record, RecordMetadata};
pub use registry::BackendRegistry;
pub use source::{FileDesiredState, StaticDesiredState};
pub use traits::{DesiredState, DnsBackend, DnsBackendFactory};
pub use zone::{RecordEntry, RecordSet, Zone, ZoneSummary};
