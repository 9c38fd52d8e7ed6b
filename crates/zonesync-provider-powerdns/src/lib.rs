// # PowerDNS Backend
//
// This crate provides the PowerDNS authoritative server backend for zonesync.
//
// ## Behavior
//
// - One HTTP request per backend call; nothing is retried or cached here
// - Errors propagate to the reconciler unchanged
// - Zone detail 404 maps to `Error::NotFound`
// - Record-set updates succeed only on 204 No Content
// - Every change is sent as a single-element PATCH
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
// - Construction fails fast if the key is empty
//
// ## API Reference
//
// - PowerDNS HTTP API: https://doc.powerdns.com/authoritative/http-api/
// - List Zones: GET `/api/v1/servers/:server_id/zones`
// - Get Zone: GET `/api/v1/servers/:server_id/zones/:zone_id`
// - Patch RRsets: PATCH `/api/v1/servers/:server_id/zones/:zone_id`

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use zonesync_core::config::BackendConfig;
use zonesync_core::traits::{DnsBackend, DnsBackendFactory};
use zonesync_core::{BackendRegistry, Error, RecordSetChange, Result, Zone, ZoneSummary};

pub use client::{DEFAULT_SERVER_ID, DEFAULT_TIMEOUT, PowerDnsClient};
pub use types::{PdnsComment, PdnsRRSet, PdnsRecord, PdnsZone, RRSetsUpdate};

/// Backend type name used in the registry
pub const BACKEND_NAME: &str = "powerdns";

/// PowerDNS DNS backend
///
/// Stateless apart from its HTTP client. Fetches zones with GET and applies
/// each [`RecordSetChange`] as one PATCH.
#[derive(Debug, Clone)]
pub struct PowerDnsBackend {
    client: PowerDnsClient,
}

impl PowerDnsBackend {
    /// Create a backend
    ///
    /// # Parameters
    ///
    /// - `base_url`: server root, e.g. `http://127.0.0.1:8081`
    /// - `api_key`: PowerDNS API key
    /// - `server_id`: server identifier, usually `localhost`
    /// - `timeout`: deadline for each request
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self::from_client(PowerDnsClient::new(
            base_url, api_key, server_id, timeout,
        )?))
    }

    /// Wrap an existing client
    pub fn from_client(client: PowerDnsClient) -> Self {
        Self { client }
    }

    /// Underlying HTTP client
    pub fn client(&self) -> &PowerDnsClient {
        &self.client
    }

    /// Check connectivity and credentials
    ///
    /// Lists the zones once and returns how many the server holds.
    pub async fn verify(&self) -> Result<usize> {
        let zones = self.client.get_zones().await?;
        tracing::debug!("PowerDNS credentials verified ({} zone(s))", zones.len());
        Ok(zones.len())
    }
}

#[async_trait]
impl DnsBackend for PowerDnsBackend {
    async fn list_zones(&self) -> Result<Vec<ZoneSummary>> {
        let zones = self.client.get_zones().await?;
        Ok(zones.iter().map(ZoneSummary::from).collect())
    }

    async fn fetch_zone(&self, zone_id: &str) -> Result<Zone> {
        tracing::debug!("Fetching PowerDNS zone {}", zone_id);
        let zone = self.client.get_zone(zone_id).await?;
        tracing::debug!("Zone {} holds {} rrset(s)", zone_id, zone.rrsets.len());
        Ok(Zone::from(zone))
    }

    async fn apply_change(&self, zone_id: &str, change: &RecordSetChange) -> Result<()> {
        tracing::debug!(
            "Sending {:?} {} {} to PowerDNS zone {}",
            change.changetype,
            change.rtype,
            change.name,
            zone_id
        );
        self.client
            .patch_rrsets(zone_id, &[PdnsRRSet::from(change)])
            .await
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }
}

/// Factory for creating PowerDNS backends
pub struct PowerDnsFactory;

impl DnsBackendFactory for PowerDnsFactory {
    fn create(&self, config: &BackendConfig) -> Result<Box<dyn DnsBackend>> {
        match config {
            BackendConfig::PowerDns {
                base_url,
                api_key,
                server_id,
                timeout_secs,
            } => {
                config.validate()?;
                Ok(Box::new(PowerDnsBackend::new(
                    base_url.clone(),
                    api_key.clone(),
                    server_id.clone(),
                    Duration::from_secs(*timeout_secs),
                )?))
            }
            _ => Err(Error::config("Invalid config for PowerDNS backend")),
        }
    }
}

/// Register the PowerDNS backend with a registry
///
/// # Example
///
/// ```rust
/// use zonesync_core::BackendRegistry;
///
/// let registry = BackendRegistry::new();
/// zonesync_provider_powerdns::register(&registry);
/// assert!(registry.has_backend("powerdns"));
/// ```
pub fn register(registry: &BackendRegistry) {
    registry.register_backend(BACKEND_NAME, Box::new(PowerDnsFactory));
}
