//! HTTP surface: the WebSocket subscriber channel and the command relay.
//!
//! [`serve`] binds, builds the router and runs until the cancellation
//! token fires or `Ctrl-C` arrives.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use error::{ServeError, ServerError};
pub use router::build_router;
pub use state::AppState;

/// Serve until `shutdown` is cancelled or the process receives `Ctrl-C`.
pub async fn serve(
    listen: &str,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> Result<(), ServeError> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| ServeError::Bind(format!("invalid address {listen}: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServeError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "fleetwatch listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move {
            tokio::select! {
                () = shutdown.cancelled() => {}
                _ = tokio::signal::ctrl_c() => info!("interrupt received, shutting down"),
            }
        })
        .await
        .map_err(|e| ServeError::Serve(e.to_string()))
}
