//! WebSocket subscriber channel.
//!
//! Clients connect to `GET /ws`. Each connection triggers a pass of its
//! own, then follows the periodic broadcast. Every message is
//! `{"event":"update","data":<FleetSnapshot>}`; degraded passes produce
//! no message at all.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use fleetwatch_core::FleetSnapshot;
use serde::Serialize;
use tracing::{debug, warn};

use super::state::AppState;

#[derive(Serialize)]
struct Update<'a> {
    event: &'static str,
    data: &'a FleetSnapshot,
}

/// Encode one snapshot as an `update` frame.
pub fn update_message(snapshot: &FleetSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Update {
        event: "update",
        data: snapshot,
    })
}

/// `GET /ws`
pub async fn ws_updates(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("subscriber connected");
    let mut updates = state.scheduler.connect();

    loop {
        tokio::select! {
            snapshot = updates.next() => {
                let Some(snapshot) = snapshot else {
                    debug!("snapshot stream closed, dropping subscriber");
                    return;
                };
                let json = match update_message(&snapshot) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(error = %e, "failed to encode snapshot");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!("subscriber disconnected (send failed)");
                    return;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("subscriber disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "subscriber socket error");
                        return;
                    }
                    // Clients have nothing to say on this channel.
                    _ => {}
                }
            }
        }
    }
}
