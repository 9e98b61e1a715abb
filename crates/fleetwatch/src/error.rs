//! CLI error types with miette diagnostics.
//!
//! Maps core, config and server errors into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fleetwatch::server::ServeError;
use fleetwatch_config::ConfigError;
use fleetwatch_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const DEGRADED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(fleetwatch::no_config),
        help("Pass --config <PATH> or set FLEETWATCH_CONFIG.")
    )]
    NoConfig { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fleetwatch::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(fleetwatch::config),
        help("Check the YAML syntax and FLEETWATCH_* environment variables.")
    )]
    Config(Box<ConfigError>),

    // ── Units ────────────────────────────────────────────────────────
    #[error("Could not reach unit {unit}")]
    #[diagnostic(
        code(fleetwatch::connection_failed),
        help("Check that the unit's REST API is enabled and reachable: {reason}")
    )]
    ConnectionFailed { unit: String, reason: String },

    #[error("Unit rejected the credentials: {message}")]
    #[diagnostic(
        code(fleetwatch::auth_failed),
        help("Verify restPassword for this unit in the config file, or pass --password.")
    )]
    AuthFailed { message: String },

    #[error("Unit call timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(fleetwatch::timeout),
        help("Raise unitTimeout in the config file or check the unit's responsiveness.")
    )]
    Timeout { timeout_ms: u64 },

    #[error("No password known for {unit}")]
    #[diagnostic(
        code(fleetwatch::unknown_unit),
        help("Pass --password, or add the unit to the config file.")
    )]
    UnknownUnit { unit: String },

    #[error("Command failed on {unit}: {message}")]
    #[diagnostic(code(fleetwatch::command_failed))]
    CommandFailed { unit: String, message: String },

    #[error("Unit API error: {message}")]
    #[diagnostic(code(fleetwatch::api_error))]
    Api { message: String },

    // ── Fleet ────────────────────────────────────────────────────────
    #[error("Fleet degraded: {failed} control channel(s) failed")]
    #[diagnostic(code(fleetwatch::degraded), help("{details}"))]
    Degraded { failed: usize, details: String },

    // ── Server ───────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(fleetwatch::server))]
    Serve(#[from] ServeError),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Serve(_) => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NoConfig { .. } | Self::UnknownUnit { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Degraded { .. } => exit_code::DEGRADED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other @ ConfigError::Figment(_) => CliError::Config(Box::new(other)),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { unit, reason } => {
                CliError::ConnectionFailed { unit, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout { timeout_ms } => CliError::Timeout { timeout_ms },
            CoreError::UnknownUnit { unit } => CliError::UnknownUnit { unit },
            CoreError::CommandRejected { unit, message, .. } => {
                CliError::CommandFailed { unit, message }
            }
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Api { message, .. } => CliError::Api { message },
            CoreError::ShutDown => CliError::Api {
                message: "scheduler already shut down".into(),
            },
        }
    }
}
