//! Shared state handed to every handler.

use fleetwatch_core::{CommandRelay, Scheduler};

pub struct AppState {
    pub scheduler: Scheduler,
    pub relay: CommandRelay,
}

impl AppState {
    pub fn new(scheduler: Scheduler, relay: CommandRelay) -> Self {
        Self { scheduler, relay }
    }
}
