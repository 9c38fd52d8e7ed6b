//! Configuration types for zonesync
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main zonesync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// DNS backend configuration
    pub backend: BackendConfig,

    /// Zones to reconcile
    pub zones: Vec<ZoneConfig>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SyncConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            backend: BackendConfig::default(),
            zones: Vec::new(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zones.is_empty() {
            return Err(crate::Error::config("No zones configured"));
        }

        for zone in &self.zones {
            zone.validate()?;
        }

        self.backend.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// DNS backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// PowerDNS authoritative server HTTP API
    PowerDns {
        /// Base URL of the API (e.g. "http://127.0.0.1:8081")
        base_url: String,
        /// Value of the X-API-Key header
        api_key: String,
        /// Server identifier in API paths
        #[serde(default = "default_server_id")]
        server_id: String,
        /// Per-request timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// Custom backend
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl BackendConfig {
    /// Validate the backend configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            BackendConfig::PowerDns {
                base_url,
                api_key,
                timeout_secs,
                ..
            } => {
                if api_key.is_empty() || base_url.is_empty() {
                    return Err(crate::Error::config(
                        "PowerDNS API key and/or base URL missing",
                    ));
                }
                if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                    return Err(crate::Error::config(format!(
                        "PowerDNS base URL must use HTTP or HTTPS scheme. Got: {}",
                        base_url
                    )));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("PowerDNS timeout must be > 0"));
                }
                Ok(())
            }
            BackendConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom backend factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom backend config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the backend type name
    pub fn type_name(&self) -> &str {
        match self {
            BackendConfig::PowerDns { .. } => "powerdns",
            BackendConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::PowerDns {
            base_url: String::new(),
            api_key: String::new(),
            server_id: default_server_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// One zone to reconcile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone identifier at the backend (e.g. "example.com.")
    pub zone_id: String,

    /// Whether this zone is reconciled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl ZoneConfig {
    /// Create a new zone configuration
    pub fn new(zone_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            enabled: true,
        }
    }

    /// Enable or disable the zone
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Validate the zone configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if crate::names::strip_fqdn(&self.zone_id).is_empty() {
            return Err(crate::Error::config("Zone identifier cannot be empty"));
        }
        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Plan corrections without applying them
    #[serde(default)]
    pub dry_run: bool,

    /// Skip the remaining corrections once one fails
    ///
    /// Already-applied corrections are never rolled back; the next pass
    /// picks up where this one stopped.
    #[serde(default = "default_stop_on_first_failure")]
    pub stop_on_first_failure: bool,

    /// TTL for record-set replacements when no record declares one
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.default_ttl == 0 {
            return Err(crate::Error::config("Default TTL must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            stop_on_first_failure: default_stop_on_first_failure(),
            default_ttl: default_ttl(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_server_id() -> String {
    "localhost".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_enabled() -> bool {
    true
}

fn default_stop_on_first_failure() -> bool {
    true
}

fn default_ttl() -> u32 {
    300
}

fn default_event_channel_capacity() -> usize {
    1000
}
