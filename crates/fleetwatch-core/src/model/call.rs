use std::fmt;

use serde::Serialize;

/// Which branch of a site a tracked channel hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChannelScope {
    /// Voice channel carried by the control channel with this number.
    Control(u32),
    /// Standalone repeater.
    Repeater,
}

impl fmt::Display for ChannelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control(no) => write!(f, "{no}"),
            Self::Repeater => f.write_str("repeater"),
        }
    }
}

/// Identity of one tracked channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallKey {
    pub site: String,
    pub scope: ChannelScope,
    pub channel_no: u32,
}

impl CallKey {
    pub fn new(site: impl Into<String>, scope: ChannelScope, channel_no: u32) -> Self {
        Self {
            site: site.into(),
            scope,
            channel_no,
        }
    }
}

/// Renders as `site-scope-channel`, e.g. `Alpha-1-2` or `Alpha-repeater-4`.
impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.site, self.scope, self.channel_no)
    }
}

/// A key-state transition on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CallEvent {
    #[serde(rename_all = "camelCase")]
    Started { key: CallKey, src_id: u32, dst_id: u32 },
    #[serde(rename_all = "camelCase")]
    Ended { key: CallKey, src_id: u32, dst_id: u32 },
}

impl CallEvent {
    pub fn key(&self) -> &CallKey {
        match self {
            Self::Started { key, .. } | Self::Ended { key, .. } => key,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_matches_log_format() {
        assert_eq!(
            CallKey::new("Alpha", ChannelScope::Control(1), 2).to_string(),
            "Alpha-1-2"
        );
        assert_eq!(
            CallKey::new("Alpha", ChannelScope::Repeater, 4).to_string(),
            "Alpha-repeater-4"
        );
    }
}
