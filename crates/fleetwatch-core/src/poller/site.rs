// ── Site aggregator ──
//
// Control channels and repeaters are fetched together; voice channels
// only once at least one control channel is up. Failures of control
// channels are reported to the caller, everything else is dropped.

use std::sync::Arc;

use fleetwatch_api::{UnitEndpoint, UnitStatus};
use futures_util::future::join_all;
use tracing::{debug, warn};

use super::Fetcher;
use crate::config::SiteConfig;
use crate::error::FetchFailure;
use crate::model::{
    CallEvent, ChannelScope, ControlChannelSnapshot, RepeaterSnapshot, SiteSnapshot, UnitAddress,
    UnitRole,
};
use crate::store::CallStateStore;

/// What one site contributed to a pass.
pub(crate) struct SitePass {
    pub snapshot: SiteSnapshot,
    pub control_failures: Vec<FetchFailure>,
    pub events: Vec<CallEvent>,
}

pub(crate) async fn poll_site(
    site: &SiteConfig,
    fetcher: &Fetcher,
    calls: &CallStateStore,
) -> SitePass {
    let control_fetches = join_all(
        site.control_channels
            .iter()
            .map(|cc| fetcher.fetch(UnitRole::ControlChannel, &cc.endpoint)),
    );
    let repeater_fetches = join_all(
        site.repeaters
            .iter()
            .map(|ep| fetcher.fetch(UnitRole::Repeater, ep)),
    );
    let (control_results, repeater_results) = tokio::join!(control_fetches, repeater_fetches);

    // ── Control channels ─────────────────────────────────────────────
    let mut control_failures = Vec::new();
    let mut accepted = Vec::new();
    for (cc, result) in site.control_channels.iter().zip(control_results) {
        let failure = match result {
            Ok(status) if status.is_accepted() => {
                accepted.push((cc, status));
                continue;
            }
            Ok(status) => FetchFailure::rejected_status(
                UnitRole::ControlChannel,
                cc.endpoint.authority(),
                status.status,
            ),
            Err(failure) => failure,
        };
        warn!(site = %site.name, error = %failure, "control channel fetch failed");
        control_failures.push(failure);
    }

    // ── Voice channels ───────────────────────────────────────────────
    let shared_voice = async {
        if accepted.is_empty() {
            Vec::new()
        } else {
            fetch_voice(fetcher, &site.name, &site.voice_channels).await
        }
    };
    let own_voice = join_all(
        accepted
            .iter()
            .map(|(cc, _)| fetch_voice(fetcher, &site.name, &cc.voice_channels)),
    );
    let (shared_voice, own_voice) = tokio::join!(shared_voice, own_voice);

    let mut events = Vec::new();
    let mut control_channels = Vec::with_capacity(accepted.len());
    for ((cc, status), own) in accepted.into_iter().zip(own_voice) {
        let voice_channels: Vec<_> = shared_voice.iter().cloned().chain(own).collect();
        let snapshot = ControlChannelSnapshot {
            status,
            unit: UnitAddress::from(&cc.endpoint),
            voice_channels,
        };
        let scope = ChannelScope::Control(snapshot.channel_no());
        events.extend(
            snapshot
                .voice_channels
                .iter()
                .filter_map(|vc| calls.observe_status(&site.name, scope, vc)),
        );
        control_channels.push(snapshot);
    }

    // ── Repeaters ────────────────────────────────────────────────────
    let mut repeaters = Vec::new();
    for (endpoint, result) in site.repeaters.iter().zip(repeater_results) {
        match result {
            Ok(status) => {
                events.extend(calls.observe_status(&site.name, ChannelScope::Repeater, &status));
                repeaters.push(RepeaterSnapshot {
                    status,
                    unit: UnitAddress::from(endpoint),
                });
            }
            Err(failure) => debug!(site = %site.name, error = %failure, "repeater dropped"),
        }
    }

    SitePass {
        snapshot: SiteSnapshot {
            name: site.name.clone(),
            control_channels,
            repeaters,
        },
        control_failures,
        events,
    }
}

/// Fetch a list of voice channels, keeping the ones that answered.
async fn fetch_voice(
    fetcher: &Fetcher,
    site: &str,
    endpoints: &[UnitEndpoint],
) -> Vec<Arc<UnitStatus>> {
    let results = join_all(
        endpoints
            .iter()
            .map(|ep| fetcher.fetch(UnitRole::VoiceChannel, ep)),
    )
    .await;

    results
        .into_iter()
        .filter_map(|result| match result {
            Ok(status) => Some(Arc::new(status)),
            Err(failure) => {
                debug!(site, error = %failure, "voice channel dropped");
                None
            }
        })
        .collect()
}
