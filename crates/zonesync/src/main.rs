// # zonesync - DNS zone reconciliation runner
//
// This binary is a THIN integration layer:
// - DO NOT add diffing, correction or DNS logic here
// - All reconciliation logic lives in zonesync-core
// - Configuration is via environment variables ONLY
//
// The runner is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering backends
// 4. Running one reconciliation pass per configured zone
// 5. Mapping the outcome to an exit code
//
// ## Configuration
//
// ### Backend
// - `ZONESYNC_BACKEND_TYPE`: Backend type (powerdns)
// - `ZONESYNC_POWERDNS_URL`: PowerDNS API base URL
// - `ZONESYNC_POWERDNS_API_KEY`: PowerDNS API key
// - `ZONESYNC_POWERDNS_SERVER_ID`: Server identifier (default: localhost)
// - `ZONESYNC_TIMEOUT_SECS`: Per-request timeout (default: 20)
//
// ### Zones
// - `ZONESYNC_ZONES`: Comma-separated zone identifiers
// - `ZONESYNC_RECORDS_FILE`: JSON file with the desired records per zone
//
// ### Engine
// - `ZONESYNC_MODE`: `apply` (default) or `dry-run`
// - `ZONESYNC_CONTINUE_ON_ERROR`: keep applying after a failed correction
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export ZONESYNC_POWERDNS_URL=http://127.0.0.1:8081
// export ZONESYNC_POWERDNS_API_KEY=your_key
// export ZONESYNC_ZONES=example.com.,example.org.
// export ZONESYNC_RECORDS_FILE=/etc/zonesync/records.json
// export ZONESYNC_MODE=dry-run
//
// zonesync
// ```

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::{
    BackendConfig, BackendRegistry, EngineConfig, FileDesiredState, OutcomeStatus, Reconciler,
    SyncConfig, ZoneConfig,
};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for the possible results of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncExitCode {
    /// Every zone reconciled (or planned, in dry-run)
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// A pass aborted (zone missing, backend unreachable, interrupted)
    RuntimeError = 2,
    /// At least one correction was rejected
    CorrectionsFailed = 3,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    backend_type: String,
    powerdns_url: String,
    powerdns_api_key: String,
    powerdns_server_id: String,
    timeout_secs: u64,
    zones: Vec<String>,
    records_file: Option<PathBuf>,
    dry_run: bool,
    continue_on_error: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = match lookup("ZONESYNC_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("ZONESYNC_TIMEOUT_SECS is not a number: {}", value))?,
            None => 20,
        };

        let dry_run = match lookup("ZONESYNC_MODE")
            .unwrap_or_else(|| "apply".to_string())
            .to_lowercase()
            .as_str()
        {
            "apply" => false,
            "dry-run" => true,
            other => anyhow::bail!(
                "ZONESYNC_MODE '{}' is not valid. Valid modes: apply, dry-run",
                other
            ),
        };

        let continue_on_error = match lookup("ZONESYNC_CONTINUE_ON_ERROR") {
            Some(value) => parse_flag(&value)
                .with_context(|| format!("ZONESYNC_CONTINUE_ON_ERROR is not a boolean: {}", value))?,
            None => false,
        };

        Ok(Self {
            backend_type: lookup("ZONESYNC_BACKEND_TYPE").unwrap_or_else(|| "powerdns".to_string()),
            powerdns_url: lookup("ZONESYNC_POWERDNS_URL").unwrap_or_default(),
            powerdns_api_key: lookup("ZONESYNC_POWERDNS_API_KEY").unwrap_or_default(),
            powerdns_server_id: lookup("ZONESYNC_POWERDNS_SERVER_ID")
                .unwrap_or_else(|| "localhost".to_string()),
            timeout_secs,
            zones: lookup("ZONESYNC_ZONES")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            records_file: lookup("ZONESYNC_RECORDS_FILE")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            dry_run,
            continue_on_error,
            log_level: lookup("ZONESYNC_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.backend_type.as_str() {
            "powerdns" => {}
            _ => anyhow::bail!(
                "ZONESYNC_BACKEND_TYPE '{}' is not supported. \
                Supported backends: powerdns",
                self.backend_type
            ),
        }

        if self.powerdns_api_key.is_empty() {
            anyhow::bail!(
                "ZONESYNC_POWERDNS_API_KEY is required. \
                Set it via: export ZONESYNC_POWERDNS_API_KEY=your_key"
            );
        }

        if self.powerdns_url.is_empty() {
            anyhow::bail!(
                "ZONESYNC_POWERDNS_URL is required. \
                Set it via: export ZONESYNC_POWERDNS_URL=http://127.0.0.1:8081"
            );
        }

        if self.zones.is_empty() {
            anyhow::bail!(
                "ZONESYNC_ZONES must contain at least one zone. \
                Set it via: export ZONESYNC_ZONES=example.com."
            );
        }

        match &self.records_file {
            None => anyhow::bail!(
                "ZONESYNC_RECORDS_FILE is required. \
                Set it via: export ZONESYNC_RECORDS_FILE=/etc/zonesync/records.json"
            ),
            Some(path) if !path.exists() => {
                anyhow::bail!("ZONESYNC_RECORDS_FILE does not exist: {}", path.display())
            }
            Some(_) => {}
        }

        if !(1..=300).contains(&self.timeout_secs) {
            anyhow::bail!(
                "ZONESYNC_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            );
        }

        self.log_level()?;

        // Backend URL scheme, zone names and engine settings
        self.to_sync_config().validate()?;

        Ok(())
    }

    /// Tracing level from `ZONESYNC_LOG_LEVEL`
    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Library configuration
    fn to_sync_config(&self) -> SyncConfig {
        SyncConfig {
            backend: BackendConfig::PowerDns {
                base_url: self.powerdns_url.clone(),
                api_key: self.powerdns_api_key.clone(),
                server_id: self.powerdns_server_id.clone(),
                timeout_secs: self.timeout_secs,
            },
            zones: self.zones.iter().map(ZoneConfig::new).collect(),
            engine: EngineConfig {
                dry_run: self.dry_run,
                stop_on_first_failure: !self.continue_on_error,
                ..EngineConfig::default()
            },
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => anyhow::bail!("expected true or false"),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SyncExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = config.log_level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    info!("Starting zonesync");
    info!("Configuration loaded: {} zone(s)", config.zones.len());

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        tokio::select! {
            outcome = run(config) => match outcome {
                Ok(code) => code,
                Err(e) => {
                    error!("Run failed: {:#}", e);
                    SyncExitCode::RuntimeError
                }
            },
            signal = wait_for_interrupt() => {
                match signal {
                    Ok(name) => warn!("Interrupted by {}; corrections already applied stay applied", name),
                    Err(e) => error!("Signal handling error: {:#}", e),
                }
                SyncExitCode::RuntimeError
            }
        }
    });

    info!("zonesync finished with exit code {}", result as u8);
    result.into()
}

/// Reconcile every configured zone
async fn run(config: Config) -> Result<SyncExitCode> {
    let sync = config.to_sync_config();

    // Create backend registry and register built-in backends
    let registry = BackendRegistry::new();

    #[cfg(feature = "powerdns")]
    {
        debug!("Registering PowerDNS backend");
        zonesync_provider_powerdns::register(&registry);
    }

    let backend = registry.create_backend(&sync.backend).with_context(|| {
        format!(
            "no usable '{}' backend (registered: {:?})",
            sync.backend.type_name(),
            registry.list_backends()
        )
    })?;

    // Fail before planning anything if the API is unreachable or the key is wrong
    let known = backend
        .list_zones()
        .await
        .context("failed to list zones; check the backend URL and credentials")?;
    info!("Backend {} reachable ({} zone(s))", backend.backend_name(), known.len());

    let (reconciler, mut events) = Reconciler::new(backend, sync.engine.clone())?;
    let event_logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "Engine event");
        }
    });

    let source = match &config.records_file {
        Some(path) => FileDesiredState::new(path),
        None => anyhow::bail!("ZONESYNC_RECORDS_FILE is required"),
    };

    let mut zone_errors = 0;
    let mut failed_corrections = 0;

    for zone in sync.zones.iter().filter(|zone| zone.enabled) {
        let report = match reconciler.reconcile_from(&source, &zone.zone_id).await {
            Ok(report) => report,
            Err(e) => {
                error!("Reconciliation of {} aborted: {}", zone.zone_id, e);
                zone_errors += 1;
                continue;
            }
        };

        for outcome in &report.outcomes {
            let marker = match &outcome.status {
                OutcomeStatus::Applied => "applied",
                OutcomeStatus::Failed { .. } => "FAILED",
                OutcomeStatus::Skipped { .. } if reconciler.is_dry_run() => "planned",
                OutcomeStatus::Skipped { .. } => "skipped",
            };
            for line in outcome.description.lines() {
                println!("{} [{}] {}", zone.zone_id, marker, line);
            }
        }

        if let Some((description, err)) = report.first_failure() {
            error!("{}: first failed correction: {} ({})", zone.zone_id, description, err);
        }
        failed_corrections += report.failed();

        info!(
            "{}: {} applied, {} failed, {} skipped in {} ms",
            zone.zone_id,
            report.applied(),
            report.failed(),
            report.skipped(),
            (report.finished_at - report.started_at).num_milliseconds()
        );
    }

    drop(reconciler);
    if let Err(e) = event_logger.await {
        warn!("Event logger task ended abnormally: {}", e);
    }

    Ok(if zone_errors > 0 {
        SyncExitCode::RuntimeError
    } else if failed_corrections > 0 {
        SyncExitCode::CorrectionsFailed
    } else {
        SyncExitCode::Success
    })
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_interrupt() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_interrupt() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
