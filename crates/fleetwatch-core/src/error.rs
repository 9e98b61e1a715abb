// ── Core error types ──
//
// Errors surfaced by fleetwatch-core. Per-unit poll failures are not
// errors in this sense: they are recorded as `FetchFailure` values inside
// a pass outcome and only decide whether the pass is degraded.

use thiserror::Error;

use crate::model::UnitRole;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach unit {unit}: {reason}")]
    ConnectionFailed { unit: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Unit call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ── Command relay ────────────────────────────────────────────────
    #[error("No password configured for unit {unit}")]
    UnknownUnit { unit: String },

    #[error("Command rejected by {unit}: {message}")]
    CommandRejected {
        unit: String,
        message: String,
        status: Option<u16>,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Scheduler is shut down")]
    ShutDown,
}

impl From<fleetwatch_api::Error> for CoreError {
    fn from(err: fleetwatch_api::Error) -> Self {
        match err {
            fleetwatch_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            fleetwatch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_ms: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        unit: e
                            .url()
                            .and_then(|u| u.host_str().map(str::to_owned))
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            fleetwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid unit address: {e}"),
            },
            fleetwatch_api::Error::Timeout { timeout_ms } => CoreError::Timeout { timeout_ms },
            fleetwatch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                unit: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fleetwatch_api::Error::Rejected { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            fleetwatch_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("Unreadable unit response: {message}"),
                status: None,
            },
        }
    }
}

// ── Per-unit poll failures ───────────────────────────────────────────

/// Why one unit contributed nothing to a pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Connection refused, deadline exceeded, TLS or address trouble.
    #[error("{role} {unit} unreachable: {reason}")]
    UnitUnreachable {
        role: UnitRole,
        unit: String,
        reason: String,
    },

    /// The unit answered, but not with an accepted status.
    #[error("{role} {unit} rejected the poll: {reason}")]
    UnitRejected {
        role: UnitRole,
        unit: String,
        status: Option<u16>,
        reason: String,
    },
}

impl FetchFailure {
    /// Classify an API error raised while polling `unit`.
    pub fn from_api(role: UnitRole, unit: String, err: &fleetwatch_api::Error) -> Self {
        if err.is_unreachable() {
            Self::UnitUnreachable {
                role,
                unit,
                reason: err.to_string(),
            }
        } else {
            Self::UnitRejected {
                role,
                unit,
                status: err.status(),
                reason: err.to_string(),
            }
        }
    }

    /// A healthy transport exchange whose body status was not accepted.
    pub fn rejected_status(role: UnitRole, unit: String, status: u16) -> Self {
        Self::UnitRejected {
            role,
            unit,
            status: Some(status),
            reason: format!("reported status {status}"),
        }
    }

    pub fn role(&self) -> UnitRole {
        match self {
            Self::UnitUnreachable { role, .. } | Self::UnitRejected { role, .. } => *role,
        }
    }

    pub fn unit(&self) -> &str {
        match self {
            Self::UnitUnreachable { unit, .. } | Self::UnitRejected { unit, .. } => unit,
        }
    }
}
