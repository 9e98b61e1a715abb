// Unit REST client
//
// Wraps `reqwest::Client` with per-unit URL construction, the token
// handshake, and response classification. One `UnitClient` is shared by
// every unit in the fleet; endpoints are passed per call.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{CommandRequest, CommandResponse, UnitStatus};
use crate::transport::{Scheme, TransportConfig};

pub(crate) const AUTH_HEADER: &str = "X-DVM-Auth-Token";
const STATUS_PATH: &str = "/status";
const COMMAND_PATH: &str = "/p25/rid";

/// Connection coordinates for one unit's REST endpoint.
#[derive(Debug, Clone)]
pub struct UnitEndpoint {
    pub host: String,
    pub port: u16,
    pub password: SecretString,
}

impl UnitEndpoint {
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: SecretString::from(password.into()),
        }
    }

    /// `host:port`, used as the token cache key and in log fields.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP client for unit REST endpoints.
///
/// Cheap to clone; clones share the connection pool and the token cache.
/// Every public call is bounded by the transport timeout, auth handshake
/// included, and never retries.
#[derive(Clone)]
pub struct UnitClient {
    http: reqwest::Client,
    scheme: Scheme,
    timeout: Duration,
    /// Auth tokens keyed by `host:port`.
    pub(crate) tokens: Arc<DashMap<String, String>>,
}

impl UnitClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, transport.scheme, transport.timeout))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, scheme: Scheme, timeout: Duration) -> Self {
        Self {
            http,
            scheme,
            timeout,
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// The per-call deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Public operations ───────────────────────────────────────────

    /// Fetch `GET /status` from one unit.
    ///
    /// The body's own `status` field is not checked here; deciding which
    /// statuses count as healthy is the caller's business.
    pub async fn fetch_status(&self, endpoint: &UnitEndpoint) -> Result<UnitStatus, Error> {
        self.bounded(self.request(Method::GET, endpoint, STATUS_PATH, None::<&()>))
            .await
    }

    /// Send a command write (`PUT /p25/rid`) to one unit.
    pub async fn issue_command(
        &self,
        endpoint: &UnitEndpoint,
        command: &str,
        dst_id: u32,
    ) -> Result<CommandResponse, Error> {
        let body = CommandRequest {
            command: command.to_owned(),
            dst_id,
        };
        debug!(unit = %endpoint.authority(), command, dst_id, "issuing command");
        self.bounded(self.request(Method::PUT, endpoint, COMMAND_PATH, Some(&body)))
            .await
    }

    // ── URL builders ────────────────────────────────────────────────

    pub(crate) fn unit_url(&self, endpoint: &UnitEndpoint, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}://{}:{}{path}",
            self.scheme.as_str(),
            endpoint.host,
            endpoint.port
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ─────────────────────────────────────────────

    /// Apply the per-call deadline to a whole exchange.
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, Error>>,
    ) -> Result<T, Error> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Authenticate if needed, send one request, decode the body.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &UnitEndpoint,
        path: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, Error> {
        let token = self.token(endpoint).await?;
        let url = self.unit_url(endpoint, path)?;
        debug!("{method} {url}");

        let mut builder = self
            .http
            .request(method, url)
            .header(AUTH_HEADER, token.as_str());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(classify_transport)?;
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            trace!(unit = %endpoint.authority(), "token rejected, dropping cached token");
            self.tokens.remove(&endpoint.authority());
            return Err(Error::Authentication {
                message: "token expired or invalid".into(),
            });
        }

        parse_body(resp).await
    }
}

/// Turn reqwest's own timeout into our `Timeout` variant.
pub(crate) fn classify_transport(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout { timeout_ms: 0 }
    } else {
        Error::Transport(err)
    }
}

/// Reject non-success statuses, then decode JSON.
pub(crate) async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Rejected {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }

    let body = resp.text().await.map_err(classify_transport)?;

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
