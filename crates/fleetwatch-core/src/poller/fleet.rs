// ── Fleet aggregator ──
//
// Runs every site concurrently under one pass lock, folds the results
// into a `FleetSnapshot`, and owns the call-state tracker across passes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use fleetwatch_api::UnitClient;
use futures_util::future::join_all;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};

use super::Fetcher;
use super::site::{SitePass, poll_site};
use crate::config::{FleetConfig, SiteConfig};
use crate::error::{CoreError, FetchFailure};
use crate::model::{CallEvent, FleetSnapshot};
use crate::store::CallStateStore;

const CALL_EVENT_CHANNEL_SIZE: usize = 256;

/// Everything one pass produced, whether or not it gets broadcast.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub snapshot: Arc<FleetSnapshot>,
    /// Call transitions detected during the pass, in site order.
    pub events: Vec<CallEvent>,
    /// Control-channel failures; non-empty exactly when the pass is degraded.
    pub failures: Vec<FetchFailure>,
}

impl PassOutcome {
    pub fn is_degraded(&self) -> bool {
        self.snapshot.error_state
    }

    /// The snapshot, if it may be shown to subscribers.
    pub fn accepted(&self) -> Option<Arc<FleetSnapshot>> {
        (!self.is_degraded()).then(|| Arc::clone(&self.snapshot))
    }
}

/// Polls the whole fleet. Passes never overlap.
pub struct FleetPoller {
    sites: Vec<SiteConfig>,
    fetcher: Fetcher,
    calls: CallStateStore,
    call_tx: broadcast::Sender<CallEvent>,
    call_state_ttl: Duration,
    passes: AtomicU64,
    pass_lock: Mutex<()>,
}

impl FleetPoller {
    /// Build a poller with its own `UnitClient` from the config's transport.
    pub fn new(config: &FleetConfig) -> Result<Self, CoreError> {
        let client = UnitClient::new(&config.transport())?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &FleetConfig, client: UnitClient) -> Self {
        let (call_tx, _) = broadcast::channel(CALL_EVENT_CHANNEL_SIZE);
        Self {
            sites: config.sites.clone(),
            fetcher: Fetcher::new(client, config.max_concurrent_fetches),
            calls: CallStateStore::new(),
            call_tx,
            call_state_ttl: config.call_state_ttl,
            passes: AtomicU64::new(0),
            pass_lock: Mutex::new(()),
        }
    }

    pub fn sites(&self) -> &[SiteConfig] {
        &self.sites
    }

    pub fn client(&self) -> &UnitClient {
        self.fetcher.client()
    }

    pub fn call_states(&self) -> &CallStateStore {
        &self.calls
    }

    /// Subscribe to call transitions as they are detected.
    pub fn subscribe_calls(&self) -> broadcast::Receiver<CallEvent> {
        self.call_tx.subscribe()
    }

    /// Number of passes completed so far.
    pub fn pass_count(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }

    /// Run one pass, waiting for any pass already in flight.
    pub async fn run_pass(&self) -> PassOutcome {
        let _pass = self.pass_lock.lock().await;
        self.pass_locked().await
    }

    /// Run one pass unless another is in flight.
    pub async fn try_run_pass(&self) -> Option<PassOutcome> {
        let _pass = self.pass_lock.try_lock().ok()?;
        Some(self.pass_locked().await)
    }

    async fn pass_locked(&self) -> PassOutcome {
        let started = Instant::now();
        let site_passes: Vec<SitePass> = join_all(
            self.sites
                .iter()
                .map(|site| poll_site(site, &self.fetcher, &self.calls)),
        )
        .await;

        let mut sites = Vec::with_capacity(site_passes.len());
        let mut events = Vec::new();
        let mut failures = Vec::new();
        for site_pass in site_passes {
            sites.push(site_pass.snapshot);
            events.extend(site_pass.events);
            failures.extend(site_pass.control_failures);
        }

        if !self.call_state_ttl.is_zero() {
            let evicted = self.calls.evict_stale(self.call_state_ttl);
            if evicted > 0 {
                debug!(evicted, "evicted stale call state");
            }
        }

        for event in &events {
            // No listeners is fine.
            let _ = self.call_tx.send(event.clone());
        }

        let pass = self.passes.fetch_add(1, Ordering::Relaxed) + 1;
        let error_state = !failures.is_empty();
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if error_state {
            warn!(
                pass,
                failed = failures.len(),
                elapsed_ms,
                "fleet degraded, snapshot withheld"
            );
        } else {
            debug!(pass, elapsed_ms, calls = events.len(), "pass complete");
        }

        PassOutcome {
            snapshot: Arc::new(FleetSnapshot {
                pass,
                completed_at: Utc::now(),
                sites,
                error_state,
            }),
            events,
            failures,
        }
    }
}
