//! PowerDNS HTTP API client
//!
//! Thin request layer: builds URLs, sets headers, maps HTTP status codes onto
//! [`zonesync_core::Error`]. Every method issues exactly one request and
//! never retries.
//!
//! ## API Reference
//!
//! - List zones: GET `/api/v1/servers/{server_id}/zones`
//! - Zone detail: GET `/api/v1/servers/{server_id}/zones/{zone_id}`
//! - Update rrsets: PATCH `/api/v1/servers/{server_id}/zones/{zone_id}`

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use zonesync_core::{Error, Result};

use crate::types::{PdnsRRSet, PdnsZone, RRSetsUpdate};

/// Server identifier used when none is configured
pub const DEFAULT_SERVER_ID: &str = "localhost";

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Header carrying the API key
const API_KEY_HEADER: &str = "X-API-Key";

/// Client for one PowerDNS server
///
/// The Debug implementation does NOT expose the API key.
#[derive(Clone)]
pub struct PowerDnsClient {
    http: reqwest::Client,
    /// `{base_url}/api/v1/servers/{server_id}`
    server_url: String,
    /// ⚠️ NEVER log this value
    api_key: String,
}

impl std::fmt::Debug for PowerDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowerDnsClient")
            .field("server_url", &self.server_url)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

impl PowerDnsClient {
    /// Create a client
    ///
    /// # Parameters
    ///
    /// - `base_url`: server root, e.g. `http://127.0.0.1:8081`
    /// - `api_key`: value for the `X-API-Key` header
    /// - `server_id`: server identifier in API paths, usually `localhost`
    /// - `timeout`: deadline for each request
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("PowerDNS API key cannot be empty"));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into();
        let server_url = format!(
            "{}/api/v1/servers/{}",
            base_url.trim_end_matches('/'),
            server_id.into()
        );

        Ok(Self {
            http,
            server_url,
            api_key,
        })
    }

    /// URL of the zone collection
    pub fn zones_url(&self) -> String {
        format!("{}/zones", self.server_url)
    }

    /// URL of one zone
    pub fn zone_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}", self.server_url, zone_id)
    }

    /// List all zones
    ///
    /// ```http
    /// GET /api/v1/servers/{server_id}/zones
    /// X-API-Key: <key>
    /// ```
    pub async fn get_zones(&self) -> Result<Vec<PdnsZone>> {
        let response = self
            .send(self.request(Method::GET, &self.zones_url()), "list zones")
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::status(
                status.as_u16(),
                format!("failed to get DNS zones: {}", status),
            ));
        }

        decode(response, "zone list").await
    }

    /// Fetch one zone with its rrsets
    ///
    /// # Returns
    ///
    /// - `Err(Error::NotFound)` on 404
    /// - `Err(Error::Transport)` on any other non-200 status
    pub async fn get_zone(&self, zone_id: &str) -> Result<PdnsZone> {
        let response = self
            .send(self.request(Method::GET, &self.zone_url(zone_id)), "get zone")
            .await?;

        match response.status() {
            StatusCode::OK => decode(response, "zone").await,
            StatusCode::NOT_FOUND => Err(Error::not_found(format!(
                "zone {} does not exist",
                zone_id
            ))),
            status => Err(Error::status(
                status.as_u16(),
                format!("failed to get DNS zone {}: {}", zone_id, status),
            )),
        }
    }

    /// Replace or delete rrsets in one request
    ///
    /// Only 204 No Content counts as success.
    pub async fn patch_rrsets(&self, zone_id: &str, rrsets: &[PdnsRRSet]) -> Result<()> {
        let body = RRSetsUpdate {
            rrsets: rrsets.to_vec(),
        };
        if tracing::enabled!(tracing::Level::TRACE) {
            let payload = serde_json::to_string(&body)?;
            tracing::trace!("PATCH {} body: {}", self.zone_url(zone_id), payload);
        }

        let response = self
            .send(
                self.request(Method::PATCH, &self.zone_url(zone_id)).json(&body),
                "update rrsets",
            )
            .await?;

        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        tracing::trace!("PATCH {} response {}: {}", zone_id, status, text);

        if status != StatusCode::NO_CONTENT {
            let message = if text.trim().is_empty() {
                format!("failed to update DNS records: {}", status)
            } else {
                format!("failed to update DNS records: {}: {}", status, text.trim())
            };
            return Err(Error::status(status.as_u16(), message));
        }

        Ok(())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::transport(format!("{} timed out: {}", operation, e))
            } else {
                Error::transport(format!("{} request failed: {}", operation, e))
            }
        })
    }
}

/// Read the body and decode it as JSON
async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|e| Error::transport(format!("failed to read {} body: {}", what, e)))?;
    tracing::trace!("{} body: {}", what, text);

    serde_json::from_str(&text)
        .map_err(|e| Error::malformed(format!("invalid {} body: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = PowerDnsClient::new(
            "http://127.0.0.1:8081/",
            "secret",
            DEFAULT_SERVER_ID,
            DEFAULT_TIMEOUT,
        )
        .unwrap();

        assert_eq!(
            client.zones_url(),
            "http://127.0.0.1:8081/api/v1/servers/localhost/zones"
        );
        assert_eq!(
            client.zone_url("example.com."),
            "http://127.0.0.1:8081/api/v1/servers/localhost/zones/example.com."
        );
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let err = PowerDnsClient::new("http://pdns", "", "localhost", DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let client =
            PowerDnsClient::new("http://pdns", "secret_key_12345", "localhost", DEFAULT_TIMEOUT)
                .unwrap();

        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("PowerDnsClient"));
    }
}
