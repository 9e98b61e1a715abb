// ── Poll scheduler ──
//
// Decides when passes run and who sees them: the timer broadcasts
// accepted snapshots to everyone, a new subscriber gets a pass of its own.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::fleet::{FleetPoller, PassOutcome};
use crate::config::FleetConfig;
use crate::error::CoreError;
use crate::stream::{BroadcastSink, Subscriber};

/// Entry point for consumers. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    poller: FleetPoller,
    sink: BroadcastSink,
    poll_interval: Duration,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Build a scheduler with its own poller and sink. Does not start
    /// polling; call [`start()`](Self::start).
    pub fn new(config: &FleetConfig) -> Result<Self, CoreError> {
        let poller = FleetPoller::new(config)?;
        Ok(Self::with_poller(
            poller,
            BroadcastSink::new(config.subscriber_buffer),
            config.poll_interval,
        ))
    }

    pub fn with_poller(poller: FleetPoller, sink: BroadcastSink, poll_interval: Duration) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                poller,
                sink,
                poll_interval,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn poller(&self) -> &FleetPoller {
        &self.inner.poller
    }

    pub fn sink(&self) -> &BroadcastSink {
        &self.inner.sink
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the periodic poll task.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            return Ok(());
        }
        let scheduler = self.clone();
        let cancel = self.inner.cancel.clone();
        handles.push(tokio::spawn(poll_task(scheduler, cancel)));
        info!(
            interval_ms = u64::try_from(self.inner.poll_interval.as_millis()).unwrap_or(u64::MAX),
            sites = self.inner.poller.sites().len(),
            "poll scheduler started"
        );
        Ok(())
    }

    /// Stop the periodic task and wait for it. A pass in flight runs to
    /// completion first.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("poll scheduler stopped");
    }

    // ── Triggers ─────────────────────────────────────────────────────

    /// Timer trigger: run a pass unless one is in flight, and broadcast
    /// the snapshot if it was accepted. `None` means the tick was skipped.
    pub async fn tick(&self) -> Option<PassOutcome> {
        let Some(outcome) = self.inner.poller.try_run_pass().await else {
            debug!("pass still in flight, skipping tick");
            return None;
        };
        if let Some(snapshot) = outcome.accepted() {
            let reached = self.inner.sink.publish(snapshot);
            debug!(pass = outcome.snapshot.pass, reached, "snapshot broadcast");
        }
        Some(outcome)
    }

    /// Connect trigger: register a subscriber and run a pass whose
    /// accepted snapshot goes to that subscriber alone.
    ///
    /// The pass keeps running if the subscriber goes away.
    pub fn connect(&self) -> Subscriber {
        let (tx, rx) = oneshot::channel();
        let subscriber = self.inner.sink.subscribe_with(rx);
        let scheduler = self.clone();
        tokio::spawn(async move {
            let outcome = scheduler.inner.poller.run_pass().await;
            match outcome.accepted() {
                Some(snapshot) => {
                    if tx.send(snapshot).is_err() {
                        debug!("subscriber left before its snapshot was ready");
                    }
                }
                None => debug!(
                    pass = outcome.snapshot.pass,
                    "on-demand pass degraded, nothing delivered"
                ),
            }
        });
        subscriber
    }

    /// Run a pass now and hand back the full outcome without broadcasting.
    pub async fn poll_now(&self) -> PassOutcome {
        self.inner.poller.run_pass().await
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn poll_task(scheduler: Scheduler, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(scheduler.inner.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                scheduler.tick().await;
            }
        }
    }
}
