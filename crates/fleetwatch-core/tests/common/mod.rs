#![allow(dead_code)]
// Mock units shared by the engine tests. One wiremock server per unit.

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetwatch_core::{ControlChannelConfig, FleetConfig, SiteConfig, UnitEndpoint};

pub const PASSWORD: &str = "s3cret";

async fn mount_auth(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path("/auth"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": 200, "token": "tok" })),
        )
        .mount(server)
        .await;
}

/// A unit answering `GET /status` with `body`.
pub async fn unit(body: Value) -> MockServer {
    let server = MockServer::start().await;
    set_status(&server, body).await;
    server
}

/// Replace what a unit answers from now on.
pub async fn set_status(server: &MockServer, body: Value) {
    server.reset().await;
    mount_auth(server).await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Make a unit stall past the test timeout.
pub async fn stall(server: &MockServer) {
    server.reset().await;
    mount_auth(server).await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": 200 }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(server)
        .await;
}

/// An endpoint nothing listens on.
pub fn dead_endpoint() -> UnitEndpoint {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    UnitEndpoint::new("127.0.0.1", port, PASSWORD)
}

pub fn endpoint(server: &MockServer) -> UnitEndpoint {
    let addr = server.address();
    UnitEndpoint::new(addr.ip().to_string(), addr.port(), PASSWORD)
}

pub fn control_channel(no: u32) -> Value {
    json!({
        "status": 200,
        "channelNo": no,
        "channelId": 1,
        "tx": false,
        "lastSrcId": 0,
        "lastDstId": 0,
        "modem": { "txFrequencyEffective": 851_012_500u64, "rxFrequencyEffective": 806_012_500u64 }
    })
}

pub fn voice_channel(no: u32, tx: bool, src: u32, dst: u32) -> Value {
    json!({
        "status": 200,
        "channelNo": no,
        "tx": tx,
        "lastSrcId": src,
        "lastDstId": dst
    })
}

/// Site with one control channel and site-wide voice channels.
pub fn site(name: &str, cc: UnitEndpoint, voice: Vec<UnitEndpoint>) -> SiteConfig {
    SiteConfig {
        name: name.into(),
        control_channels: vec![ControlChannelConfig::new(cc)],
        voice_channels: voice,
        repeaters: Vec::new(),
    }
}

pub fn fleet(sites: Vec<SiteConfig>) -> FleetConfig {
    FleetConfig {
        sites,
        poll_interval: Duration::from_millis(100),
        unit_timeout: Duration::from_millis(300),
        ..FleetConfig::default()
    }
}
