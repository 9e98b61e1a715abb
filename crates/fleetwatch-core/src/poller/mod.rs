// ── Polling engine ──
//
// `site` fans out over the units of one site, `fleet` over every site,
// and `scheduler` decides when a pass runs and who sees its result.

mod fleet;
mod scheduler;
mod site;

use std::sync::Arc;

use fleetwatch_api::{UnitClient, UnitEndpoint, UnitStatus};
use tokio::sync::Semaphore;

use crate::error::FetchFailure;
use crate::model::UnitRole;

pub use fleet::{FleetPoller, PassOutcome};
pub use scheduler::Scheduler;

/// Unit client plus the fleet-wide cap on requests in flight.
#[derive(Clone)]
pub(crate) struct Fetcher {
    client: UnitClient,
    permits: Arc<Semaphore>,
}

impl Fetcher {
    pub(crate) fn new(client: UnitClient, max_in_flight: usize) -> Self {
        Self {
            client,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub(crate) fn client(&self) -> &UnitClient {
        &self.client
    }

    /// One status call. Waiting for a permit does not count against the
    /// unit timeout.
    pub(crate) async fn fetch(
        &self,
        role: UnitRole,
        endpoint: &UnitEndpoint,
    ) -> Result<UnitStatus, FetchFailure> {
        let Ok(_permit) = self.permits.acquire().await else {
            return Err(FetchFailure::UnitUnreachable {
                role,
                unit: endpoint.authority(),
                reason: "fetch limiter closed".into(),
            });
        };

        self.client
            .fetch_status(endpoint)
            .await
            .map_err(|e| FetchFailure::from_api(role, endpoint.authority(), &e))
    }
}
