#![allow(clippy::unwrap_used)]
// Integration tests for `UnitClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetwatch_api::auth::password_digest;
use fleetwatch_api::{Error, Scheme, UnitClient, UnitEndpoint};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, UnitClient, UnitEndpoint) {
    let server = MockServer::start().await;
    let addr = server.address();
    let endpoint = UnitEndpoint::new(addr.ip().to_string(), addr.port(), "s3cret");
    let client = UnitClient::with_client(
        reqwest::Client::new(),
        Scheme::Http,
        Duration::from_millis(500),
    );
    (server, client, endpoint)
}

async fn mount_auth(server: &MockServer, token: serde_json::Value) {
    Mock::given(method("PUT"))
        .and(path("/auth"))
        .and(body_json(json!({ "auth": password_digest("s3cret") })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": 200, "token": token })),
        )
        .mount(server)
        .await;
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_status_authenticates_then_reads() {
    let (server, client, endpoint) = setup().await;
    mount_auth(&server, json!(123_456_789u64)).await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .and(header("X-DVM-Auth-Token", "123456789"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "channelNo": 1,
            "channelId": 2,
            "tx": false,
            "lastSrcId": 0,
            "lastDstId": 0,
            "modem": { "txFrequencyEffective": 851_012_500u64, "rxFrequencyEffective": 806_012_500u64 }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let status = client.fetch_status(&endpoint).await.unwrap();
    assert!(status.is_accepted());
    assert_eq!(status.channel_no, Some(1));
    assert_eq!(
        status.modem.unwrap().rx_frequency_effective,
        Some(806_012_500)
    );

    // Second call reuses the cached token.
    client.fetch_status(&endpoint).await.unwrap();
}

#[tokio::test]
async fn test_fetch_status_http_error_is_rejected() {
    let (server, client, endpoint) = setup().await;
    mount_auth(&server, json!("tok")).await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("modem offline"))
        .mount(&server)
        .await;

    let result = client.fetch_status(&endpoint).await;
    match result {
        Err(Error::Rejected { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "modem offline");
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_status_times_out() {
    let (server, client, endpoint) = setup().await;
    mount_auth(&server, json!("tok")).await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": 200 }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = client.fetch_status(&endpoint).await;
    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
    assert!(result.unwrap_err().is_unreachable());
}

#[tokio::test]
async fn test_fetch_status_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let (_server, client, _) = setup().await;
    let endpoint = UnitEndpoint::new("127.0.0.1", port, "s3cret");

    let result = client.fetch_status(&endpoint).await;
    let err = result.unwrap_err();
    assert!(err.is_unreachable(), "expected unreachable, got: {err:?}");
}

#[tokio::test]
async fn test_garbage_body_is_deserialization_error() {
    let (server, client, endpoint) = setup().await;
    mount_auth(&server, json!("tok")).await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let result = client.fetch_status(&endpoint).await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization, got: {result:?}"
    );
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_auth_failure() {
    let (server, client, endpoint) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/auth"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": 400, "message": "invalid password" })),
        )
        .mount(&server)
        .await;

    let result = client.fetch_status(&endpoint).await;
    match result {
        Err(Error::Authentication { message }) => assert_eq!(message, "invalid password"),
        other => panic!("expected Authentication, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_drops_token() {
    let (server, client, endpoint) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 200, "token": 7 })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let first = client.fetch_status(&endpoint).await;
    assert!(matches!(first, Err(Error::Authentication { .. })));

    // Token was dropped, so the next call authenticates again.
    let second = client.fetch_status(&endpoint).await;
    assert!(matches!(second, Err(Error::Authentication { .. })));
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_issue_command() {
    let (server, client, endpoint) = setup().await;
    mount_auth(&server, json!("tok")).await;

    Mock::given(method("PUT"))
        .and(path("/p25/rid"))
        .and(header("X-DVM-Auth-Token", "tok"))
        .and(body_json(json!({ "command": "check", "dstId": 4242 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": 200, "message": "OK" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.issue_command(&endpoint, "check", 4242).await.unwrap();
    assert_eq!(resp.status, Some(200));
    assert_eq!(resp.message.as_deref(), Some("OK"));
}

#[tokio::test]
async fn test_issue_command_rejected() {
    let (server, client, endpoint) = setup().await;
    mount_auth(&server, json!("tok")).await;

    Mock::given(method("PUT"))
        .and(path("/p25/rid"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown command"))
        .mount(&server)
        .await;

    let err = client.issue_command(&endpoint, "bogus", 1).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}
