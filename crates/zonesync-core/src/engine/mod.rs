//! Core reconciliation engine
//!
//! The Reconciler is responsible for:
//! - Fetching the current zone via DnsBackend
//! - Diffing it against the desired records
//! - Building ordered corrections
//! - Applying them one at a time, fail-fast
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐      ┌──────────────┐
//! │ DesiredState │      │  DnsBackend  │
//! │  (records)   │      │ (fetch_zone) │
//! └──────────────┘      └──────────────┘
//!        │                     │
//!        └──────────┬──────────┘
//!                   ▼
//!            ┌──────────────┐
//!            │  Reconciler  │── plan: diff + CorrectionBuilder
//!            └──────────────┘
//!                   │
//!        ┌──────────┴──────────┐
//!        ▼                     ▼
//! ┌──────────────┐      ┌──────────────┐
//! │  DnsBackend  │      │    Events    │
//! │(apply_change)│      │   (notify)   │
//! └──────────────┘      └──────────────┘
//! ```
//!
//! ## Pass Flow
//!
//! 1. Reject desired input with duplicate keys or conflicting set TTLs/comments
//! 2. Fetch the zone (a missing zone aborts the pass)
//! 3. Flatten, diff and build corrections (any error aborts the pass)
//! 4. Apply corrections in order: deletes, modifies, creates
//! 5. Stop at the first failure; report every planned correction
//!
//! Nothing is retried and nothing is rolled back. Running the pass again
//! is how a partially applied zone converges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::correction::{Correction, CorrectionBuilder};
use crate::diff::{self, ChangeKind};
use crate::error::{Error, Result};
use crate::record::Record;
use crate::traits::{DesiredState, DnsBackend};

/// Why a correction was not executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Engine runs in dry-run mode
    DryRun,
    /// An earlier correction of the same pass failed
    AbortedAfterFailure,
}

/// Events emitted by the Reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Reconciliation pass started
    ReconcileStarted { zone_id: String },

    /// Corrections computed
    PlanComputed {
        zone_id: String,
        corrections: usize,
        unchanged: usize,
    },

    /// Correction applied at the backend
    CorrectionApplied {
        zone_id: String,
        description: String,
    },

    /// Correction rejected by the backend
    CorrectionFailed {
        zone_id: String,
        description: String,
        error: String,
    },

    /// Correction not executed
    CorrectionSkipped {
        zone_id: String,
        description: String,
        reason: SkipReason,
    },

    /// Reconciliation pass finished
    ReconcileFinished {
        zone_id: String,
        applied: usize,
        failed: usize,
        skipped: usize,
    },
}

/// Corrections planned for one zone
///
/// Descriptions are available before and independent of execution, so a
/// plan doubles as a dry-run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Zone identifier the plan targets
    pub zone_id: String,
    /// Zone origin (no trailing dot)
    pub zone_name: String,
    /// Corrections in execution order
    pub corrections: Vec<Correction>,
    /// Number of records already in the desired state
    pub unchanged: usize,
}

impl Plan {
    /// Whether the zone already matches the desired state
    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    /// Number of corrections
    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    /// Correction descriptions in execution order
    pub fn descriptions(&self) -> Vec<&str> {
        self.corrections
            .iter()
            .map(|correction| correction.description.as_str())
            .collect()
    }
}

/// Execution status of one correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Backend accepted the change
    Applied,
    /// Backend rejected the change or the call failed
    Failed { error: String },
    /// Not executed
    Skipped { reason: SkipReason },
}

/// Outcome of one correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    /// Create, modify or delete
    pub kind: ChangeKind,
    /// Correction description
    pub description: String,
    /// What happened
    pub status: OutcomeStatus,
}

/// Per-correction results of one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Zone identifier
    pub zone_id: String,
    /// One outcome per planned correction, in plan order
    pub outcomes: Vec<CorrectionOutcome>,
    /// When execution started
    pub started_at: DateTime<Utc>,
    /// When execution finished
    pub finished_at: DateTime<Utc>,
}

impl ApplyReport {
    /// Number of applied corrections
    pub fn applied(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Applied))
    }

    /// Number of failed corrections
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Failed { .. }))
    }

    /// Number of skipped corrections
    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Skipped { .. }))
    }

    /// Whether no correction failed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// First failure, as `(description, error)`
    pub fn first_failure(&self) -> Option<(&str, &str)> {
        self.outcomes.iter().find_map(|outcome| match &outcome.status {
            OutcomeStatus::Failed { error } => Some((outcome.description.as_str(), error.as_str())),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.status))
            .count()
    }
}

/// Core reconciliation engine
///
/// The engine runs a linear pipeline per pass (fetch, diff, build, apply)
/// with no internal parallelism. It holds its own backend client; callers
/// must serialize passes per zone themselves.
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Run a pass with [`Reconciler::reconcile()`], or split it into
///    [`Reconciler::plan()`] and [`Reconciler::apply()`]
/// 3. Consume [`EngineEvent`]s from the returned receiver
pub struct Reconciler {
    /// DNS backend for fetching and mutating zones
    backend: Box<dyn DnsBackend>,

    /// Engine settings
    config: EngineConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `backend`: DNS backend implementation
    /// - `config`: engine configuration
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver) where event_receiver yields engine events
    pub fn new(
        backend: Box<dyn DnsBackend>,
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let reconciler = Self {
            backend,
            config,
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    /// Backend this reconciler talks to
    pub fn backend(&self) -> &dyn DnsBackend {
        self.backend.as_ref()
    }

    /// Whether corrections are planned but never executed
    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }

    /// Compute the corrections for one zone
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`]: duplicate `(name, type, target)` in `desired`,
    ///   or one record-set declaring differing TTLs or comments
    /// - [`Error::NotFound`]: the zone does not exist at the backend
    /// - [`Error::Reconciliation`]: a name is outside the zone
    /// - any fetch error from the backend
    ///
    /// No mutation is attempted in any case.
    pub async fn plan(&self, zone_id: &str, desired: &[Record]) -> Result<Plan> {
        let desired: Vec<Record> = desired
            .iter()
            .cloned()
            .map(|mut record| {
                record.normalize_name();
                record
            })
            .collect();

        if let Some(duplicate) = diff::find_duplicate(&desired) {
            return Err(Error::invalid_input(format!(
                "duplicate desired record: {}",
                duplicate
            )));
        }

        if let Some(conflict) = diff::find_set_conflict(&desired) {
            return Err(Error::invalid_input(conflict));
        }

        let zone = match self.backend.fetch_zone(zone_id).await {
            Ok(zone) => zone,
            Err(e) if e.is_not_found() => {
                error!(
                    "Zone {} does not exist at {}; zones must be created beforehand",
                    zone_id,
                    self.backend.backend_name()
                );
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let current = zone.flatten()?;
        debug!(
            "Fetched {} current record(s) for {} ({} desired)",
            current.len(),
            zone.origin(),
            desired.len()
        );

        let changes = diff::diff(&desired, &current);
        let builder = CorrectionBuilder::new(zone_id, zone.origin(), self.config.default_ttl);
        let corrections = builder.build_all(&changes, &desired, &current)?;

        let plan = Plan {
            zone_id: zone_id.to_string(),
            zone_name: zone.origin().to_string(),
            corrections,
            unchanged: changes.unchanged.len(),
        };

        self.emit_event(EngineEvent::PlanComputed {
            zone_id: plan.zone_id.clone(),
            corrections: plan.len(),
            unchanged: plan.unchanged,
        });

        Ok(plan)
    }

    /// Execute a plan's corrections in order
    ///
    /// Every planned correction gets an outcome. Errors are recorded in the
    /// report rather than returned.
    pub async fn apply(&self, plan: &Plan) -> ApplyReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(plan.len());
        let mut aborted = false;

        for correction in &plan.corrections {
            let status = if self.config.dry_run {
                info!("[DRY-RUN] Would apply: {}", correction.description);
                self.skip(plan, correction, SkipReason::DryRun)
            } else if aborted {
                self.skip(plan, correction, SkipReason::AbortedAfterFailure)
            } else {
                match correction.execute(self.backend.as_ref()).await {
                    Ok(()) => {
                        info!("Applied: {}", correction.description);
                        self.emit_event(EngineEvent::CorrectionApplied {
                            zone_id: plan.zone_id.clone(),
                            description: correction.description.clone(),
                        });
                        OutcomeStatus::Applied
                    }
                    Err(e) => {
                        error!("Failed to apply {}: {}", correction.description, e);
                        self.emit_event(EngineEvent::CorrectionFailed {
                            zone_id: plan.zone_id.clone(),
                            description: correction.description.clone(),
                            error: e.to_string(),
                        });
                        aborted = self.config.stop_on_first_failure;
                        OutcomeStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            };

            outcomes.push(CorrectionOutcome {
                kind: correction.kind,
                description: correction.description.clone(),
                status,
            });
        }

        ApplyReport {
            zone_id: plan.zone_id.clone(),
            outcomes,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Run a full pass for one zone
    pub async fn reconcile(&self, zone_id: &str, desired: &[Record]) -> Result<ApplyReport> {
        self.emit_event(EngineEvent::ReconcileStarted {
            zone_id: zone_id.to_string(),
        });
        info!(
            "Reconciling {} via {} [mode: {}]",
            zone_id,
            self.backend.backend_name(),
            if self.config.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        let plan = self.plan(zone_id, desired).await?;
        if plan.is_empty() {
            info!("Zone {} is up to date ({} record(s))", zone_id, plan.unchanged);
        } else {
            info!("Zone {} needs {} correction(s)", zone_id, plan.len());
        }

        let report = self.apply(&plan).await;

        self.emit_event(EngineEvent::ReconcileFinished {
            zone_id: zone_id.to_string(),
            applied: report.applied(),
            failed: report.failed(),
            skipped: report.skipped(),
        });

        Ok(report)
    }

    /// Run a full pass for one zone, reading its records from `source`
    pub async fn reconcile_from(
        &self,
        source: &dyn DesiredState,
        zone_id: &str,
    ) -> Result<ApplyReport> {
        let desired = source.records(zone_id).await?;
        self.reconcile(zone_id, &desired).await
    }

    fn skip(&self, plan: &Plan, correction: &Correction, reason: SkipReason) -> OutcomeStatus {
        self.emit_event(EngineEvent::CorrectionSkipped {
            zone_id: plan.zone_id.clone(),
            description: correction.description.clone(),
            reason,
        });
        OutcomeStatus::Skipped { reason }
    }

    /// Emit an engine event
    ///
    /// Never blocks: a full channel drops the event.
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
