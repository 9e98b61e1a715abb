//! Axum router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::state::AppState;
use super::{handlers, ws};

/// Build the router:
/// - `GET /ws` -- snapshot stream, one `update` message per accepted pass
/// - `PUT /api/command` -- relay a command to one unit
/// - `GET /api/health` -- liveness and subscriber count
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws::ws_updates))
        .route("/api/command", put(handlers::put_command))
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
