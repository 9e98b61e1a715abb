//! Configuration for the fleetwatch binary.
//!
//! A YAML deployment file describing sites and their units, layered with
//! `FLEETWATCH_*` environment overrides, validated and translated into
//! `fleetwatch_core::FleetConfig`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fleetwatch_core::{ControlChannelConfig, FleetConfig, SiteConfig, TlsVerification, UnitEndpoint};

/// Where the deployment file lives unless told otherwise.
pub const DEFAULT_CONFIG_PATH: &str = "./configs/configs.yml";

const ENV_PREFIX: &str = "FLEETWATCH_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── YAML config structs ─────────────────────────────────────────────

/// Top-level deployment file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Listen address for the HTTP server.
    pub address: String,
    pub port: u16,

    #[serde(with = "duration")]
    pub poll_interval: Duration,

    /// Deadline for one unit call.
    #[serde(with = "duration")]
    pub unit_timeout: Duration,

    #[serde(with = "duration")]
    pub call_state_ttl: Duration,

    pub max_concurrent_fetches: usize,

    /// Snapshots buffered per subscriber before it starts skipping.
    pub subscriber_buffer: usize,

    /// Reach units over HTTPS.
    pub https: bool,

    /// Accept self-signed unit certificates.
    pub insecure: bool,

    /// CA bundle for unit certificates; ignored when `insecure` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub sites: Vec<Site>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: 3000,
            poll_interval: Duration::from_secs(1),
            unit_timeout: Duration::from_secs(2),
            call_state_ttl: Duration::from_secs(600),
            max_concurrent_fetches: 32,
            subscriber_buffer: 16,
            https: false,
            insecure: true,
            ca_cert: None,
            sites: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub name: String,
    #[serde(default)]
    pub control_channels: Vec<ControlChannel>,
    #[serde(default)]
    pub voice_channels: Vec<Unit>,
    #[serde(default)]
    pub repeaters: Vec<Unit>,
}

/// REST coordinates of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub rest_address: String,
    pub rest_port: u16,
    #[serde(default)]
    pub rest_password: String,
}

impl Unit {
    fn endpoint(&self) -> UnitEndpoint {
        UnitEndpoint::new(
            self.rest_address.clone(),
            self.rest_port,
            self.rest_password.clone(),
        )
    }
}

/// A control channel, optionally with voice channels of its own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlChannel {
    pub rest_address: String,
    pub rest_port: u16,
    #[serde(default)]
    pub rest_password: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub voice_channels: Vec<Unit>,
}

impl ControlChannel {
    fn unit(&self) -> Unit {
        Unit {
            rest_address: self.rest_address.clone(),
            rest_port: self.rest_port,
            rest_password: self.rest_password.clone(),
        }
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load and validate the deployment file at `path`, then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Yaml::file(path))
        .merge(env_overrides())
        .extract()?;

    config.validate()?;
    Ok(config)
}

/// `FLEETWATCH_POLL_INTERVAL=500ms` overrides `pollInterval`, and so on.
fn env_overrides() -> Env {
    Env::prefixed(ENV_PREFIX)
        .lowercase(false)
        .map(|key| camel_case(key.as_str()).into())
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

// ── Validation ──────────────────────────────────────────────────────

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(invalid("port", "must be non-zero"));
        }
        if self.poll_interval.is_zero() {
            return Err(invalid("pollInterval", "must be greater than zero"));
        }
        if self.unit_timeout.is_zero() {
            return Err(invalid("unitTimeout", "must be greater than zero"));
        }
        if self.call_state_ttl.is_zero() {
            return Err(invalid("callStateTtl", "must be greater than zero"));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(invalid("maxConcurrentFetches", "must be at least 1"));
        }
        if self.subscriber_buffer == 0 {
            return Err(invalid("subscriberBuffer", "must be at least 1"));
        }

        let mut seen = HashSet::new();
        for (i, site) in self.sites.iter().enumerate() {
            let name = site.name.trim();
            if name.is_empty() {
                return Err(invalid(format!("sites[{i}].name"), "must not be empty"));
            }
            if !seen.insert(name) {
                return Err(invalid(
                    format!("sites[{i}].name"),
                    format!("duplicate site '{name}'"),
                ));
            }
            site.validate_units(i)?;
        }
        Ok(())
    }

    /// `address:port` for the HTTP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Translate into the engine's runtime configuration.
    pub fn to_fleet_config(&self) -> FleetConfig {
        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca) = self.ca_cert {
            TlsVerification::CustomCa(ca.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        FleetConfig {
            sites: self.sites.iter().map(Site::to_site_config).collect(),
            poll_interval: self.poll_interval,
            unit_timeout: self.unit_timeout,
            call_state_ttl: self.call_state_ttl,
            max_concurrent_fetches: self.max_concurrent_fetches,
            subscriber_buffer: self.subscriber_buffer,
            https: self.https,
            tls,
        }
    }
}

impl Site {
    fn validate_units(&self, index: usize) -> Result<(), ConfigError> {
        let units = self
            .control_channels
            .iter()
            .map(ControlChannel::unit)
            .chain(
                self.control_channels
                    .iter()
                    .flat_map(|cc| cc.voice_channels.iter().cloned()),
            )
            .chain(self.voice_channels.iter().cloned())
            .chain(self.repeaters.iter().cloned());

        for unit in units {
            if unit.rest_address.trim().is_empty() {
                return Err(invalid(
                    format!("sites[{index}].restAddress"),
                    "must not be empty",
                ));
            }
            if unit.rest_port == 0 {
                return Err(invalid(
                    format!("sites[{index}].restPort"),
                    format!("unit {} has port 0", unit.rest_address),
                ));
            }
        }
        Ok(())
    }

    fn to_site_config(&self) -> SiteConfig {
        SiteConfig {
            name: self.name.trim().to_owned(),
            control_channels: self
                .control_channels
                .iter()
                .map(|cc| ControlChannelConfig {
                    endpoint: cc.unit().endpoint(),
                    voice_channels: cc.voice_channels.iter().map(Unit::endpoint).collect(),
                })
                .collect(),
            voice_channels: self.voice_channels.iter().map(Unit::endpoint).collect(),
            repeaters: self.repeaters.iter().map(Unit::endpoint).collect(),
        }
    }
}

// ── Duration (de)serialization ──────────────────────────────────────

/// Humantime strings (`"1s"`, `"10m"`), or a bare integer of milliseconds.
mod duration {
    use std::fmt;
    use std::time::Duration;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        deserializer.deserialize_any(DurationVisitor)
    }

    struct DurationVisitor;

    impl Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a duration such as \"1s\" or a number of milliseconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            humantime::parse_duration(v.trim()).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_millis(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_millis)
                .map_err(|_| E::custom("duration must not be negative"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r"
address: 127.0.0.1
port: 8080
pollInterval: 500ms
callStateTtl: 5m
sites:
  - name: Alpha
    controlChannels:
      - restAddress: 10.0.0.1
        restPort: 9990
        restPassword: cc-pass
        voiceChannels:
          - { restAddress: 10.0.0.5, restPort: 9990, restPassword: own }
    voiceChannels:
      - { restAddress: 10.0.0.2, restPort: 9990, restPassword: vc-pass }
  - name: Bravo
    repeaters:
      - { restAddress: 10.1.0.1, restPort: 9991, restPassword: r }
";

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_sample_with_defaults() {
        let file = write_config(SAMPLE);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.unit_timeout, Duration::from_secs(2));
        assert_eq!(config.call_state_ttl, Duration::from_secs(300));
        assert_eq!(config.max_concurrent_fetches, 32);
        assert!(config.insecure);
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.sites[0].control_channels[0].voice_channels.len(), 1);
        assert!(config.sites[1].control_channels.is_empty());
    }

    #[test]
    fn translates_to_fleet_config() {
        let file = write_config(SAMPLE);
        let fleet = load_config(file.path()).unwrap().to_fleet_config();

        assert_eq!(fleet.sites[0].name, "Alpha");
        assert_eq!(fleet.sites[0].control_channels[0].endpoint.host, "10.0.0.1");
        assert_eq!(fleet.sites[0].control_channels[0].voice_channels.len(), 1);
        assert_eq!(fleet.sites[0].voice_channels[0].port, 9990);
        assert_eq!(fleet.sites[1].repeaters[0].port, 9991);
        assert_eq!(fleet.tls, TlsVerification::DangerAcceptInvalid);
        assert!(fleet.find_endpoint("10.1.0.1", 9991).is_some());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_config(Path::new("/nonexistent/fleet.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        assert!(err.to_string().contains("/nonexistent/fleet.yml"));
    }

    #[test]
    fn duplicate_site_names_are_rejected() {
        let file = write_config("sites:\n  - name: Alpha\n  - name: Alpha\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate site 'Alpha'"), "{err}");
    }

    #[test]
    fn blank_site_name_is_rejected() {
        let file = write_config("sites:\n  - name: '  '\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn zero_values_are_rejected() {
        for body in [
            "port: 0\n",
            "pollInterval: 0s\n",
            "unitTimeout: 0\n",
            "callStateTtl: 0\n",
            "maxConcurrentFetches: 0\n",
            "subscriberBuffer: 0\n",
            "sites:\n  - name: A\n    repeaters:\n      - { restAddress: x, restPort: 0 }\n",
        ] {
            let file = write_config(body);
            assert!(
                matches!(load_config(file.path()), Err(ConfigError::Validation { .. })),
                "accepted: {body}"
            );
        }
    }

    #[test]
    fn bad_duration_is_a_load_error() {
        let file = write_config("pollInterval: soon\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Figment(_))
        ));
    }

    #[test]
    fn environment_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("fleet.yml", SAMPLE)?;
            jail.set_env("FLEETWATCH_POLL_INTERVAL", "250ms");
            jail.set_env("FLEETWATCH_MAX_CONCURRENT_FETCHES", "4");
            jail.set_env("FLEETWATCH_PORT", "9000");

            let config = load_config(Path::new("fleet.yml")).map_err(|e| e.to_string())?;
            assert_eq!(config.poll_interval, Duration::from_millis(250));
            assert_eq!(config.max_concurrent_fetches, 4);
            assert_eq!(config.port, 9000);
            Ok(())
        });
    }

    #[test]
    fn camel_case_keys() {
        assert_eq!(camel_case("POLL_INTERVAL"), "pollInterval");
        assert_eq!(camel_case("ADDRESS"), "address");
    }
}
