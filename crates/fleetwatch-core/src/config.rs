// ── Runtime fleet configuration ──
//
// These types describe *what* to poll and *how often*. They carry unit
// credentials and tuning, but never touch disk: the binary loads a
// config file, validates it, and hands a `FleetConfig` in.

use std::time::Duration;

use fleetwatch_api::{Scheme, TlsMode, TransportConfig, UnitEndpoint};

/// TLS verification strategy for HTTPS units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Units ship with self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// A control channel plus the voice channels that only it carries.
#[derive(Debug, Clone)]
pub struct ControlChannelConfig {
    pub endpoint: UnitEndpoint,
    /// Voice channels polled for this control channel in addition to the
    /// site-wide list.
    pub voice_channels: Vec<UnitEndpoint>,
}

impl ControlChannelConfig {
    pub fn new(endpoint: UnitEndpoint) -> Self {
        Self {
            endpoint,
            voice_channels: Vec::new(),
        }
    }
}

/// One named site.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub name: String,
    pub control_channels: Vec<ControlChannelConfig>,
    /// Voice channels shared by every control channel of the site.
    pub voice_channels: Vec<UnitEndpoint>,
    pub repeaters: Vec<UnitEndpoint>,
}

impl SiteConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control_channels: Vec::new(),
            voice_channels: Vec::new(),
            repeaters: Vec::new(),
        }
    }

    /// Every endpoint this site polls, control channels first.
    pub fn endpoints(&self) -> impl Iterator<Item = &UnitEndpoint> {
        self.control_channels
            .iter()
            .flat_map(|cc| std::iter::once(&cc.endpoint).chain(cc.voice_channels.iter()))
            .chain(self.voice_channels.iter())
            .chain(self.repeaters.iter())
    }
}

/// Everything the engine needs to run.
///
/// Built by the binary and passed to `Scheduler`; core never reads config files.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Sites in the order they appear in snapshots.
    pub sites: Vec<SiteConfig>,
    /// Period of the background poll timer.
    pub poll_interval: Duration,
    /// Deadline for one unit call, auth handshake included.
    pub unit_timeout: Duration,
    /// Call-state entries not observed for this long are evicted. Zero
    /// disables eviction.
    pub call_state_ttl: Duration,
    /// Upper bound on unit requests in flight across the whole fleet.
    pub max_concurrent_fetches: usize,
    /// Capacity of the snapshot broadcast channel.
    pub subscriber_buffer: usize,
    /// Reach units over HTTPS instead of HTTP.
    pub https: bool,
    pub tls: TlsVerification,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            sites: Vec::new(),
            poll_interval: Duration::from_secs(1),
            unit_timeout: Duration::from_secs(2),
            call_state_ttl: Duration::from_secs(600),
            max_concurrent_fetches: 32,
            subscriber_buffer: 16,
            https: false,
            tls: TlsVerification::default(),
        }
    }
}

impl FleetConfig {
    /// Translate into the API crate's transport settings.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            scheme: if self.https { Scheme::Https } else { Scheme::Http },
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.unit_timeout,
        }
    }

    /// Look up the configured endpoint (and so its password) for a unit.
    pub fn find_endpoint(&self, host: &str, port: u16) -> Option<&UnitEndpoint> {
        self.sites
            .iter()
            .flat_map(SiteConfig::endpoints)
            .find(|ep| ep.host == host && ep.port == port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        let mut cc = ControlChannelConfig::new(UnitEndpoint::new("10.0.0.1", 9990, "a"));
        cc.voice_channels.push(UnitEndpoint::new("10.0.0.2", 9990, "b"));
        SiteConfig {
            name: "Alpha".into(),
            control_channels: vec![cc],
            voice_channels: vec![UnitEndpoint::new("10.0.0.3", 9990, "c")],
            repeaters: vec![UnitEndpoint::new("10.0.0.4", 9991, "d")],
        }
    }

    #[test]
    fn endpoints_walks_every_role() {
        let site = site();
        let hosts: Vec<_> = site.endpoints().map(|ep| ep.host.as_str()).collect();
        assert_eq!(hosts, ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"]);
    }

    #[test]
    fn find_endpoint_matches_host_and_port() {
        let config = FleetConfig {
            sites: vec![site()],
            ..FleetConfig::default()
        };
        assert!(config.find_endpoint("10.0.0.4", 9991).is_some());
        assert!(config.find_endpoint("10.0.0.4", 9990).is_none());
    }

    #[test]
    fn transport_follows_https_flag() {
        let config = FleetConfig {
            https: true,
            unit_timeout: Duration::from_millis(750),
            ..FleetConfig::default()
        };
        let transport = config.transport();
        assert_eq!(transport.scheme, Scheme::Https);
        assert_eq!(transport.timeout, Duration::from_millis(750));
    }
}
