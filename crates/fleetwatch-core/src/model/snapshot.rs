use std::sync::Arc;

use chrono::{DateTime, Utc};
use fleetwatch_api::{UnitEndpoint, UnitStatus};
use serde::Serialize;
use strum::{Display, EnumString};

/// Which part a unit plays in a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UnitRole {
    ControlChannel,
    VoiceChannel,
    Repeater,
}

/// Where a unit lives. The credential is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitAddress {
    pub address: String,
    pub port: u16,
}

impl From<&UnitEndpoint> for UnitAddress {
    fn from(endpoint: &UnitEndpoint) -> Self {
        Self {
            address: endpoint.host.clone(),
            port: endpoint.port,
        }
    }
}

/// A control channel that answered with an accepted status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlChannelSnapshot {
    #[serde(flatten)]
    pub status: UnitStatus,
    #[serde(flatten)]
    pub unit: UnitAddress,
    /// Voice channels that responded, site-wide ones first. Shared with the
    /// other control channels of the site.
    pub voice_channels: Vec<Arc<UnitStatus>>,
}

impl ControlChannelSnapshot {
    /// Scope used for tracker keys of this control channel's voice channels.
    pub fn channel_no(&self) -> u32 {
        self.status.channel_no.unwrap_or_default()
    }
}

/// A repeater that responded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeaterSnapshot {
    #[serde(flatten)]
    pub status: UnitStatus,
    #[serde(flatten)]
    pub unit: UnitAddress,
}

/// One site as seen by a single pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSnapshot {
    pub name: String,
    pub control_channels: Vec<ControlChannelSnapshot>,
    pub repeaters: Vec<RepeaterSnapshot>,
}

impl SiteSnapshot {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control_channels: Vec::new(),
            repeaters: Vec::new(),
        }
    }
}

/// Result of one fleet-wide pass. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSnapshot {
    /// Monotonic pass number, starting at 1.
    pub pass: u64,
    pub completed_at: DateTime<Utc>,
    /// One entry per configured site, in configuration order.
    pub sites: Vec<SiteSnapshot>,
    /// Set when any control-channel fetch failed during this pass.
    pub error_state: bool,
}

impl FleetSnapshot {
    pub fn site(&self, name: &str) -> Option<&SiteSnapshot> {
        self.sites.iter().find(|s| s.name == name)
    }
}
