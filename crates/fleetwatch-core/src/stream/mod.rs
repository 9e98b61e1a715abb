// ── Snapshot fan-out ──
//
// Accepted fleet snapshots go out over a broadcast channel. A subscriber
// may also hold a one-shot slot for the result of the pass its own
// connection triggered; whichever arrives, snapshots are delivered in
// pass order and never repeated.

use std::sync::Arc;

use tokio::sync::{broadcast, oneshot};
use tracing::debug;

use crate::model::FleetSnapshot;

/// Publishing side of the subscriber channel. Cheap to clone.
#[derive(Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Arc<FleetSnapshot>>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Send a snapshot to every subscriber. Returns how many were reached.
    pub fn publish(&self, snapshot: Arc<FleetSnapshot>) -> usize {
        self.tx.send(snapshot).unwrap_or(0)
    }

    pub fn subscribe(&self) -> Subscriber {
        Subscriber {
            direct: None,
            shared: self.tx.subscribe(),
            last_pass: None,
        }
    }

    /// Subscribe with a private slot for an on-demand snapshot.
    pub(crate) fn subscribe_with(
        &self,
        direct: oneshot::Receiver<Arc<FleetSnapshot>>,
    ) -> Subscriber {
        Subscriber {
            direct: Some(direct),
            ..self.subscribe()
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One connected consumer of fleet snapshots.
pub struct Subscriber {
    direct: Option<oneshot::Receiver<Arc<FleetSnapshot>>>,
    shared: broadcast::Receiver<Arc<FleetSnapshot>>,
    last_pass: Option<u64>,
}

enum Arrival {
    Direct(Result<Arc<FleetSnapshot>, oneshot::error::RecvError>),
    Shared(Result<Arc<FleetSnapshot>, broadcast::error::RecvError>),
}

impl Subscriber {
    /// Wait for the next snapshot newer than the last one delivered.
    ///
    /// Returns `None` once the sink is gone.
    pub async fn next(&mut self) -> Option<Arc<FleetSnapshot>> {
        loop {
            let arrival = match self.direct.as_mut() {
                Some(direct) => tokio::select! {
                    biased;
                    result = direct => Arrival::Direct(result),
                    result = self.shared.recv() => Arrival::Shared(result),
                },
                None => Arrival::Shared(self.shared.recv().await),
            };

            let snapshot = match arrival {
                Arrival::Direct(result) => {
                    self.direct = None;
                    match result {
                        Ok(snapshot) => snapshot,
                        // On-demand pass was degraded.
                        Err(_) => continue,
                    }
                }
                Arrival::Shared(Ok(snapshot)) => snapshot,
                Arrival::Shared(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    debug!(skipped, "subscriber lagged, skipping to newest snapshot");
                    continue;
                }
                Arrival::Shared(Err(broadcast::error::RecvError::Closed)) => return None,
            };

            if self.last_pass.is_some_and(|last| snapshot.pass <= last) {
                continue;
            }
            self.last_pass = Some(snapshot.pass);
            return Some(snapshot);
        }
    }
}
