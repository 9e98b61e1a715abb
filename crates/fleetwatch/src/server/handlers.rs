//! REST handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use fleetwatch_core::{RelayCommand, parse_dst_id};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::ServerError;
use super::state::AppState;

/// Body of `PUT /api/command`. Browser forms send numbers as strings, so
/// `port` and `dstId` are taken loosely and checked here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandBody {
    pub command: String,
    pub address: String,
    pub port: Value,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub dst_id: Value,
}

impl CommandBody {
    fn into_relay(self) -> Result<RelayCommand, ServerError> {
        if self.command.trim().is_empty() {
            return Err(ServerError::BadRequest("command must not be empty".into()));
        }
        let port = match &self.port {
            Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|p| *p != 0)
        .ok_or_else(|| ServerError::BadRequest(format!("invalid port {}", self.port)))?;

        Ok(RelayCommand {
            dst_id: parse_dst_id(&self.dst_id),
            command: self.command,
            address: self.address,
            port,
            password: self
                .password
                .filter(|p| !p.is_empty())
                .map(SecretString::from),
        })
    }
}

/// `PUT /api/command`
pub async fn put_command(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CommandBody>,
) -> Result<Json<Value>, ServerError> {
    let cmd = body.into_relay()?;
    let response = state.relay.relay(&cmd).await?;
    Ok(Json(json!({
        "message": "Command sent successfully",
        "data": response,
    })))
}

/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "passes": state.scheduler.poller().pass_count(),
        "subscribers": state.scheduler.sink().subscriber_count(),
        "activeCalls": state.scheduler.poller().call_states().active_calls().len(),
    }))
}
