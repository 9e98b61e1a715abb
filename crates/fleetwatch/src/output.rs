//! Output formatting for one-shot commands: table, JSON, YAML.
//!
//! Tables flatten a fleet snapshot into one row per unit; structured
//! formats serialize the snapshot as subscribers see it.

use std::io::{self, Write};

use clap::ValueEnum;
use fleetwatch_core::{FleetSnapshot, UnitRole, UnitStatus};
use tabled::{Table, Tabled, settings::Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One row per unit (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

// ── Rows ─────────────────────────────────────────────────────────────

#[derive(Debug, Tabled)]
pub struct UnitRow {
    #[tabled(rename = "Site")]
    pub site: String,
    #[tabled(rename = "Role")]
    pub role: String,
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[tabled(rename = "Ch")]
    pub channel: String,
    #[tabled(rename = "Tx Freq")]
    pub tx_freq: String,
    #[tabled(rename = "Rx Freq")]
    pub rx_freq: String,
    #[tabled(rename = "Keyed")]
    pub keyed: String,
    #[tabled(rename = "Src")]
    pub src: String,
    #[tabled(rename = "Dst")]
    pub dst: String,
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

impl UnitRow {
    fn new(site: &str, role: UnitRole, unit: String, status: &UnitStatus) -> Self {
        let modem = status.modem.as_ref();
        Self {
            site: site.to_owned(),
            role: role.to_string(),
            unit,
            channel: or_dash(status.channel_no),
            tx_freq: or_dash(modem.and_then(|m| m.tx_frequency_effective).map(format_frequency)),
            rx_freq: or_dash(modem.and_then(|m| m.rx_frequency_effective).map(format_frequency)),
            keyed: if status.keyed() { "yes" } else { "no" }.into(),
            src: or_dash(status.last_src_id),
            dst: or_dash(status.last_dst_id),
        }
    }
}

/// Flatten a snapshot: each control channel followed by its voice
/// channels, then the site's repeaters.
pub fn snapshot_rows(snapshot: &FleetSnapshot) -> Vec<UnitRow> {
    let mut rows = Vec::new();
    for site in &snapshot.sites {
        for cc in &site.control_channels {
            let unit = format!("{}:{}", cc.unit.address, cc.unit.port);
            rows.push(UnitRow::new(&site.name, UnitRole::ControlChannel, unit, &cc.status));
            for vc in &cc.voice_channels {
                rows.push(UnitRow::new(&site.name, UnitRole::VoiceChannel, "-".into(), vc));
            }
        }
        for rpt in &site.repeaters {
            let unit = format!("{}:{}", rpt.unit.address, rpt.unit.port);
            rows.push(UnitRow::new(&site.name, UnitRole::Repeater, unit, &rpt.status));
        }
    }
    rows
}

/// Hz as `xxx.xxx.xxx`, zero-padded to nine digits.
pub fn format_frequency(hz: u64) -> String {
    let digits = format!("{hz:09}");
    format!("{}.{}.{}", &digits[0..3], &digits[3..6], &digits[6..9])
}

// ── Renderers ────────────────────────────────────────────────────────

pub fn render_snapshot(format: OutputFormat, snapshot: &FleetSnapshot) -> String {
    match format {
        OutputFormat::Table => render_table(&snapshot_rows(snapshot)),
        OutputFormat::Json => render_json(snapshot, false),
        OutputFormat::JsonCompact => render_json(snapshot, true),
        OutputFormat::Yaml => render_yaml(snapshot),
    }
}

/// Render any serializable value; tables fall back to pretty JSON.
pub fn render_value<T: serde::Serialize + ?Sized>(format: OutputFormat, data: &T) -> String {
    match format {
        OutputFormat::Table | OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let result = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    result.unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use fleetwatch_core::{ControlChannelSnapshot, SiteSnapshot, UnitAddress};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn status(value: serde_json::Value) -> UnitStatus {
        serde_json::from_value(value).unwrap()
    }

    fn snapshot(voice: UnitStatus) -> FleetSnapshot {
        FleetSnapshot {
            pass: 1,
            completed_at: serde_json::from_value(json!("2024-05-01T12:00:00Z")).unwrap(),
            sites: vec![SiteSnapshot {
                name: "Alpha".into(),
                control_channels: vec![ControlChannelSnapshot {
                    status: status(json!({
                        "status": 200,
                        "channelNo": 1,
                        "modem": { "txFrequencyEffective": 851_012_500u64, "rxFrequencyEffective": 806_012_500u64 }
                    })),
                    unit: UnitAddress {
                        address: "10.0.0.1".into(),
                        port: 9990,
                    },
                    voice_channels: vec![Arc::new(voice)],
                }],
                repeaters: Vec::new(),
            }],
            error_state: false,
        }
    }

    #[test]
    fn frequency_is_grouped_in_threes() {
        assert_eq!(format_frequency(851_012_500), "851.012.500");
        assert_eq!(format_frequency(12_500), "000.012.500");
    }

    #[test]
    fn rows_follow_snapshot_order() {
        let voice = status(json!({
            "status": 200, "channelNo": 2, "tx": true, "lastSrcId": 100, "lastDstId": 200
        }));
        let rows = snapshot_rows(&snapshot(voice));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].role, "control-channel");
        assert_eq!(rows[0].unit, "10.0.0.1:9990");
        assert_eq!(rows[0].tx_freq, "851.012.500");
        assert_eq!(rows[0].keyed, "no");
        assert_eq!(rows[1].role, "voice-channel");
        assert_eq!(rows[1].keyed, "yes");
        assert_eq!(rows[1].src, "100");
        assert_eq!(rows[1].rx_freq, "-");
    }

    #[test]
    fn table_output_mentions_every_unit() {
        let voice = status(json!({ "status": 200, "channelNo": 2 }));
        let table = render_snapshot(OutputFormat::Table, &snapshot(voice));
        assert!(table.contains("Alpha"));
        assert!(table.contains("voice-channel"));
    }

    #[test]
    fn json_output_is_the_wire_shape() {
        let voice = status(json!({ "status": 200, "channelNo": 2 }));
        let out = render_snapshot(OutputFormat::JsonCompact, &snapshot(voice));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["sites"][0]["controlChannels"][0]["voiceChannels"][0]["channelNo"], 2);
    }
}
