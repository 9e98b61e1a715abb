// ── Command relay ──
//
// Pass-through of operator commands to one unit. The caller names the
// unit by address and port; a password given with the request wins,
// otherwise the one from the fleet config is used.

use fleetwatch_api::{CommandResponse, UnitClient, UnitEndpoint};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::config::FleetConfig;
use crate::error::CoreError;

/// One command bound for one unit.
#[derive(Debug, Clone)]
pub struct RelayCommand {
    pub command: String,
    pub address: String,
    pub port: u16,
    pub password: Option<SecretString>,
    pub dst_id: u32,
}

/// Forwards commands through the shared unit client.
#[derive(Clone)]
pub struct CommandRelay {
    client: UnitClient,
    known: Vec<UnitEndpoint>,
}

impl CommandRelay {
    pub fn new(client: UnitClient, config: &FleetConfig) -> Self {
        Self {
            client,
            known: config
                .sites
                .iter()
                .flat_map(|site| site.endpoints().cloned())
                .collect(),
        }
    }

    fn resolve(&self, cmd: &RelayCommand) -> Result<UnitEndpoint, CoreError> {
        if let Some(password) = &cmd.password {
            return Ok(UnitEndpoint::new(
                cmd.address.clone(),
                cmd.port,
                password.expose_secret(),
            ));
        }
        self.known
            .iter()
            .find(|ep| ep.host == cmd.address && ep.port == cmd.port)
            .cloned()
            .ok_or_else(|| CoreError::UnknownUnit {
                unit: format!("{}:{}", cmd.address, cmd.port),
            })
    }

    /// Send the command once. No retry.
    pub async fn relay(&self, cmd: &RelayCommand) -> Result<CommandResponse, CoreError> {
        let endpoint = self.resolve(cmd)?;
        let unit = endpoint.authority();
        info!(unit = %unit, command = %cmd.command, dst_id = cmd.dst_id, "relaying command");

        self.client
            .issue_command(&endpoint, &cmd.command, cmd.dst_id)
            .await
            .map_err(|e| {
                warn!(unit = %unit, error = %e, "command failed");
                CoreError::CommandRejected {
                    unit,
                    status: e.status(),
                    message: e.to_string(),
                }
            })
    }
}

/// Lenient destination id parsing: numbers are truncated, strings are
/// read up to the first non-digit, anything else is 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_dst_id(value: &serde_json::Value) -> u32 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| {
                n.as_f64()
                    .filter(|f| (0.0..=f64::from(u32::MAX)).contains(f))
                    .map(|f| f.trunc() as u32)
            })
            .unwrap_or(0),
        serde_json::Value::String(s) => {
            let s = s.trim_start();
            let s = s.strip_prefix('+').unwrap_or(s);
            let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
            s[..end].parse().unwrap_or(0)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dst_id_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_dst_id(&json!(4242)), 4242);
        assert_eq!(parse_dst_id(&json!(12.9)), 12);
        assert_eq!(parse_dst_id(&json!("1234")), 1234);
        assert_eq!(parse_dst_id(&json!(" 77abc")), 77);
    }

    #[test]
    fn dst_id_falls_back_to_zero() {
        assert_eq!(parse_dst_id(&json!("abc")), 0);
        assert_eq!(parse_dst_id(&json!(-5)), 0);
        assert_eq!(parse_dst_id(&json!(null)), 0);
        assert_eq!(parse_dst_id(&json!("99999999999")), 0);
    }

    #[test]
    fn resolve_prefers_request_password_then_config() {
        let mut site = crate::config::SiteConfig::new("Alpha");
        site.repeaters.push(UnitEndpoint::new("10.0.0.9", 9990, "from-config"));
        let config = FleetConfig {
            sites: vec![site],
            ..FleetConfig::default()
        };
        let relay = CommandRelay::new(
            UnitClient::with_client(
                reqwest::Client::new(),
                fleetwatch_api::Scheme::Http,
                std::time::Duration::from_secs(1),
            ),
            &config,
        );

        let mut cmd = RelayCommand {
            command: "check".into(),
            address: "10.0.0.9".into(),
            port: 9990,
            password: None,
            dst_id: 1,
        };
        let ep = relay.resolve(&cmd).ok();
        assert_eq!(
            ep.map(|ep| ep.password.expose_secret().to_owned()).as_deref(),
            Some("from-config")
        );

        cmd.password = Some(SecretString::from("given".to_owned()));
        let ep = relay.resolve(&cmd).ok();
        assert_eq!(
            ep.map(|ep| ep.password.expose_secret().to_owned()).as_deref(),
            Some("given")
        );

        cmd.password = None;
        cmd.port = 1;
        assert!(matches!(
            relay.resolve(&cmd),
            Err(CoreError::UnknownUnit { .. })
        ));
    }
}
