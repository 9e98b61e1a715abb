// ── Call-state tracker ──
//
// Edge detector over per-channel key state. Each observation overwrites
// the stored state; a transition of the `tx` flag yields a `CallEvent`.
// Keys are independent, so per-shard locking in `DashMap` is enough.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use fleetwatch_api::UnitStatus;
use tracing::{debug, info};

use crate::model::{CallEvent, CallKey, ChannelScope};

/// Last observation recorded for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallState {
    pub tx: bool,
    pub src_id: u32,
    pub dst_id: u32,
    pub last_seen: Instant,
}

/// Fleet-global map from channel identity to last key state.
#[derive(Debug, Default)]
pub struct CallStateStore {
    states: DashMap<CallKey, CallState>,
}

impl CallStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation and report the transition it causes, if any.
    ///
    /// Observations with a zero source or destination id carry no call and
    /// are dropped without touching the stored state.
    pub fn observe(&self, key: CallKey, tx: bool, src_id: u32, dst_id: u32) -> Option<CallEvent> {
        if src_id == 0 || dst_id == 0 {
            return None;
        }

        let current = CallState {
            tx,
            src_id,
            dst_id,
            last_seen: Instant::now(),
        };
        let was_keyed = self
            .states
            .insert(key.clone(), current)
            .is_some_and(|prev| prev.tx);

        match (was_keyed, tx) {
            (false, true) => {
                info!(key = %key, src_id, dst_id, "call started");
                Some(CallEvent::Started {
                    key,
                    src_id,
                    dst_id,
                })
            }
            (true, false) => {
                info!(key = %key, src_id, dst_id, "call ended");
                Some(CallEvent::Ended {
                    key,
                    src_id,
                    dst_id,
                })
            }
            _ => None,
        }
    }

    /// Feed a decoded unit status. Units that report no channel number
    /// cannot be keyed and are skipped.
    pub fn observe_status(
        &self,
        site: &str,
        scope: ChannelScope,
        status: &UnitStatus,
    ) -> Option<CallEvent> {
        let Some(channel_no) = status.channel_no else {
            debug!(site, %scope, "status carries no channel number, not tracked");
            return None;
        };
        self.observe(
            CallKey::new(site, scope, channel_no),
            status.keyed(),
            status.last_src_id.unwrap_or_default(),
            status.last_dst_id.unwrap_or_default(),
        )
    }

    /// Drop entries not observed within `ttl`. Returns how many were removed.
    pub fn evict_stale(&self, ttl: Duration) -> usize {
        let before = self.states.len();
        self.states.retain(|_, state| state.last_seen.elapsed() < ttl);
        before.saturating_sub(self.states.len())
    }

    pub fn get(&self, key: &CallKey) -> Option<CallState> {
        self.states.get(key).map(|entry| *entry.value())
    }

    /// Keys currently transmitting.
    pub fn active_calls(&self) -> Vec<CallKey> {
        self.states
            .iter()
            .filter(|entry| entry.value().tx)
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
