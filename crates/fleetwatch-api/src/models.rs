// Unit REST response types
//
// Units return a flat JSON object from `GET /status`. Only the fields the
// poller interprets are modelled explicitly; everything else is kept in
// `extra` so subscribers still see the full device payload. Fields use
// `#[serde(default)]` because different unit roles omit different keys.

use serde::{Deserialize, Serialize};

/// HTTP-equivalent status value units embed in every body.
pub const STATUS_OK: u16 = 200;

// ── Status ───────────────────────────────────────────────────────────

/// Decoded body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatus {
    /// Status code the unit reports in the body (200 when healthy).
    #[serde(default)]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_no: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<u32>,
    /// Key state: `true` while the channel is transmitting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_src_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dst_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modem: Option<ModemStatus>,
    /// Catch-all for fields the poller does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UnitStatus {
    /// Whether the unit reported itself healthy.
    pub fn is_accepted(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Key state, treating an absent flag as idle.
    pub fn keyed(&self) -> bool {
        self.tx.unwrap_or(false)
    }
}

/// Modem block nested inside [`UnitStatus`]. Frequencies are in Hz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModemStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_frequency_effective: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx_frequency_effective: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Auth ─────────────────────────────────────────────────────────────

/// Body sent to `PUT /auth`: hex-encoded SHA-256 of the unit password.
#[derive(Debug, Serialize)]
pub(crate) struct AuthRequest {
    pub auth: String,
}

/// Response of `PUT /auth`. Units emit the token as a JSON number,
/// older firmware as a string.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub token: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Commands ─────────────────────────────────────────────────────────

/// Body of a command write (`PUT /p25/rid`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub command: String,
    pub dst_id: u32,
}

/// Whatever the unit answered to a command write, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_keeps_unknown_fields() {
        let raw = json!({
            "status": 200,
            "channelNo": 3,
            "channelId": 1,
            "tx": true,
            "lastSrcId": 100,
            "lastDstId": 200,
            "modem": { "txFrequencyEffective": 851_012_500u64, "rxFrequencyEffective": 806_012_500u64, "pttInvert": false },
            "state": 5,
            "peerId": 9000
        });

        let status: UnitStatus = serde_json::from_value(raw).unwrap();

        assert!(status.is_accepted());
        assert!(status.keyed());
        assert_eq!(status.channel_no, Some(3));
        assert_eq!(status.last_src_id, Some(100));
        let modem = status.modem.as_ref().unwrap();
        assert_eq!(modem.tx_frequency_effective, Some(851_012_500));
        assert!(modem.extra.contains_key("pttInvert"));
        assert_eq!(status.extra.get("peerId"), Some(&json!(9000)));

        let back = serde_json::to_value(&status).unwrap();
        assert_eq!(back["lastDstId"], json!(200));
        assert_eq!(back["state"], json!(5));
    }

    #[test]
    fn sparse_status_defaults_to_idle() {
        let status: UnitStatus = serde_json::from_value(json!({ "status": 200 })).unwrap();
        assert!(!status.keyed());
        assert_eq!(status.channel_no, None);
        assert_eq!(status.modem, None);
    }

    #[test]
    fn command_request_uses_wire_names() {
        let body = serde_json::to_value(CommandRequest {
            command: "page".into(),
            dst_id: 1234,
        })
        .unwrap();
        assert_eq!(body, json!({ "command": "page", "dstId": 1234 }));
    }
}
