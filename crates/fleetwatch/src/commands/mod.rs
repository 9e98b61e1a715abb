//! Subcommand handlers.

pub mod command;
pub mod poll;
pub mod serve;

use std::path::Path;

use fleetwatch_config::{Config, ConfigError, load_config};

/// Load the deployment file, or fall back to defaults when it is
/// missing and `optional` is set.
pub(crate) fn config_or_default(path: &Path, optional: bool) -> Result<Config, ConfigError> {
    match load_config(path) {
        Err(ConfigError::NotFound { .. }) if optional => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
        other => other,
    }
}
