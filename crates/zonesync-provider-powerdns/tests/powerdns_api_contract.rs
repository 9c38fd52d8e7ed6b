//! Architectural Contract Test: PowerDNS HTTP API
//!
//! This test verifies the backend against a mocked PowerDNS server.
//!
//! Constraints verified:
//! - Requests hit `/api/v1/servers/{server_id}/zones[/{zone_id}]`
//! - Every request carries the API key and accepts JSON
//! - Zone 404 maps to NotFound; other failures map to Transport
//! - Undecodable bodies map to MalformedResponse
//! - PATCH succeeds only on 204 and sends one rrset per change
//!
//! If this test fails, the backend no longer speaks the PowerDNS API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zonesync_core::{
    ChangeType, DnsBackend, EngineConfig, Error, Record, RecordEntry, RecordSetChange, Reconciler,
};
use zonesync_provider_powerdns::PowerDnsBackend;

const API_KEY: &str = "secret";
const ZONE_PATH: &str = "/api/v1/servers/localhost/zones/example.com.";

fn backend(server: &MockServer) -> PowerDnsBackend {
    PowerDnsBackend::new(server.uri(), API_KEY, "localhost", Duration::from_secs(5)).unwrap()
}

fn zone_body() -> serde_json::Value {
    json!({
        "id": "example.com.",
        "name": "example.com.",
        "kind": "Native",
        "rrsets": [
            {
                "name": "example.com.",
                "type": "NS",
                "ttl": 3600,
                "records": [{"content": "ns1.example.net.", "disabled": false}]
            },
            {
                "name": "a.example.com.",
                "type": "A",
                "ttl": 300,
                "records": [{"content": "1.1.1.1", "disabled": false}]
            },
            {
                "name": "old.example.com.",
                "type": "A",
                "ttl": 300,
                "records": [{"content": "9.9.9.9", "disabled": false}]
            }
        ]
    })
}

#[tokio::test]
async fn fetch_zone_sends_key_and_decodes_rrsets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .and(header("X-API-Key", API_KEY))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zone_body()))
        .expect(1)
        .mount(&server)
        .await;

    let zone = backend(&server).fetch_zone("example.com.").await.unwrap();

    assert_eq!(zone.record_sets.len(), 3);
    let records = zone.flatten().unwrap();
    assert_eq!(records[1], Record::new("a.example.com", "A", "1.1.1.1", 300));
}

#[tokio::test]
async fn missing_zone_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones/missing.example."))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Could not find domain"})),
        )
        .mount(&server)
        .await;

    let err = backend(&server)
        .fetch_zone("missing.example.")
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "got {:?}", err);
}

#[tokio::test]
async fn server_error_is_transport_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend(&server).fetch_zone("example.com.").await.unwrap_err();

    assert!(matches!(err, Error::Transport { .. }), "got {:?}", err);
    assert_eq!(err.http_status(), Some(500));
}

#[tokio::test]
async fn undecodable_body_is_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = backend(&server).fetch_zone("example.com.").await.unwrap_err();

    assert!(matches!(err, Error::MalformedResponse(_)), "got {:?}", err);
}

#[tokio::test]
async fn slow_server_times_out_as_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(zone_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let backend =
        PowerDnsBackend::new(server.uri(), API_KEY, "localhost", Duration::from_millis(100))
            .unwrap();
    let err = backend.fetch_zone("example.com.").await.unwrap_err();

    assert!(matches!(err, Error::Transport { status: None, .. }), "got {:?}", err);
}

#[tokio::test]
async fn list_zones_and_verify() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones"))
        .and(header("X-API-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "example.com.", "name": "example.com.", "kind": "Native"},
            {"id": "example.org.", "name": "example.org.", "kind": "Master"}
        ])))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let zones = backend.list_zones().await.unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[1].name, "example.org.");
    assert_eq!(backend.verify().await.unwrap(), 2);
}

#[tokio::test]
async fn verify_fails_with_bad_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = backend(&server).verify().await.unwrap_err();

    assert_eq!(err.http_status(), Some(401));
}

#[tokio::test]
async fn replace_is_single_rrset_patch() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .and(header("X-API-Key", API_KEY))
        .and(body_json(json!({
            "rrsets": [{
                "name": "www.example.com.",
                "type": "A",
                "ttl": 300,
                "changetype": "REPLACE",
                "records": [{"content": "1.2.3.4", "disabled": false, "set-ptr": false}]
            }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let change = RecordSetChange {
        name: "www.example.com.".to_string(),
        rtype: "A".to_string(),
        ttl: Some(300),
        changetype: ChangeType::Replace,
        records: vec![RecordEntry::new("1.2.3.4")],
        comments: Vec::new(),
    };

    backend(&server)
        .apply_change("example.com.", &change)
        .await
        .unwrap();
}

#[tokio::test]
async fn patch_other_than_204_is_transport_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"error": "RRset www.example.com. IN A: Conflicts with CNAME"})),
        )
        .mount(&server)
        .await;

    let change = RecordSetChange {
        name: "www.example.com.".to_string(),
        rtype: "A".to_string(),
        ttl: Some(300),
        changetype: ChangeType::Replace,
        records: vec![RecordEntry::new("1.2.3.4")],
        comments: Vec::new(),
    };

    let err = backend(&server)
        .apply_change("example.com.", &change)
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(422));
    let message = err.to_string();
    assert!(message.contains("422 Unprocessable Entity"), "{}", message);
    assert!(message.contains("Conflicts with CNAME"), "{}", message);
}

#[tokio::test]
async fn ok_instead_of_no_content_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let change = RecordSetChange {
        name: "old.example.com.".to_string(),
        rtype: "A".to_string(),
        ttl: None,
        changetype: ChangeType::Delete,
        records: vec![RecordEntry::new("9.9.9.9")],
        comments: Vec::new(),
    };

    let err = backend(&server)
        .apply_change("example.com.", &change)
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(200));
}

#[tokio::test]
async fn reconcile_against_mock_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(zone_body()))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(3)
        .mount(&server)
        .await;

    let desired = vec![
        Record::new("example.com", "NS", "ns1.example.net.", 3600),
        Record::new("a.example.com", "A", "1.1.1.1", 600),
        Record::new("www.example.com", "A", "1.2.3.4", 300),
    ];
    let (reconciler, _events) =
        Reconciler::new(Box::new(backend(&server)), EngineConfig::default()).unwrap();

    let report = reconciler.reconcile("example.com.", &desired).await.unwrap();
    assert_eq!(report.applied(), 3);

    let patches: Vec<serde_json::Value> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.method.as_str() == "PATCH")
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect();

    let changetypes: Vec<&str> = patches
        .iter()
        .map(|body| body["rrsets"][0]["changetype"].as_str().unwrap())
        .collect();
    assert_eq!(changetypes, vec!["DELETE", "REPLACE", "REPLACE"]);
    assert_eq!(patches[0]["rrsets"][0]["name"], "old.example.com.");
    assert_eq!(patches[1]["rrsets"][0]["ttl"], 600);
    assert_eq!(patches[2]["rrsets"][0]["name"], "www.example.com.");
}
