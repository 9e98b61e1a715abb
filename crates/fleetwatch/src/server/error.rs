//! Error types for the HTTP layer.
//!
//! [`ServerError`] is what handlers return; its
//! [`IntoResponse`](axum::response::IntoResponse) impl renders the JSON
//! shape command-relay callers expect.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fleetwatch_core::CoreError;

/// Failures surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The request body was well-formed JSON but not a usable command.
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Relaying the command to the unit failed.
    #[error(transparent)]
    Relay(#[from] CoreError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "Invalid command request"),
            Self::Relay(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error sending command"),
        };

        let body = serde_json::json!({
            "message": message,
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Errors that stop the server itself.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("bind error: {0}")]
    Bind(String),

    #[error("serve error: {0}")]
    Serve(String),
}
