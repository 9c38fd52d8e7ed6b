// # DNS Backend Trait
//
// Defines the interface to an authoritative DNS server's management API.
//
// ## Implementations
//
// - PowerDNS: `zonesync-provider-powerdns` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::DnsBackend;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let backend = /* DnsBackend implementation */;
//
//     // Fetch the current record-sets of a zone
//     let zone = backend.fetch_zone("example.com.").await?;
//     let current = zone.flatten()?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::correction::RecordSetChange;
use crate::zone::{Zone, ZoneSummary};

/// Trait for DNS backend implementations
///
/// A backend plays two roles in a reconciliation pass: it fetches the
/// current zone (the remote state fetcher) and applies one record-set
/// change at a time (the remote mutator).
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - Single-shot: one remote call per `apply_change`
/// - No retries or backoff: return the error, the caller decides
/// - No caching: every `fetch_zone` reflects the server at call time
/// - Each backend owns its own client; no process-wide shared state
#[async_trait]
pub trait DnsBackend: Send + Sync {
    /// List the zones known to the backend
    async fn list_zones(&self) -> Result<Vec<ZoneSummary>, crate::Error>;

    /// Fetch a zone with all of its record-sets
    ///
    /// # Returns
    ///
    /// - `Ok(Zone)`: zone data
    /// - `Err(Error::NotFound)`: the zone does not exist
    /// - `Err(Error::Transport | Error::MalformedResponse)`: any other failure
    async fn fetch_zone(&self, zone_id: &str) -> Result<Zone, crate::Error>;

    /// Apply one record-set replace or delete
    ///
    /// All-or-nothing from the caller's point of view.
    async fn apply_change(
        &self,
        zone_id: &str,
        change: &RecordSetChange,
    ) -> Result<(), crate::Error>;

    /// Nameservers published at the zone apex
    async fn nameservers(&self, zone_id: &str) -> Result<Vec<String>, crate::Error> {
        Ok(self.fetch_zone(zone_id).await?.nameservers())
    }

    /// Get the backend name (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS backends from configuration
pub trait DnsBackendFactory: Send + Sync {
    /// Create a DnsBackend instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this backend
    ///
    /// # Returns
    ///
    /// A boxed DnsBackend trait object
    fn create(
        &self,
        config: &crate::config::BackendConfig,
    ) -> Result<Box<dyn DnsBackend>, crate::Error>;
}
