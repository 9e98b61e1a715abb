//! `fleetwatch serve`: the long-running mode.

use std::sync::Arc;

use fleetwatch::server::{self, AppState};
use fleetwatch_config::load_config;
use fleetwatch_core::{CommandRelay, Scheduler};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{GlobalOpts, ServeArgs};
use crate::error::CliError;

pub async fn handle(args: ServeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut config = load_config(&global.config)?;
    if let Some(address) = args.address {
        config.address = address;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let fleet = config.to_fleet_config();
    let scheduler = Scheduler::new(&fleet)?;
    let relay = CommandRelay::new(scheduler.poller().client().clone(), &fleet);
    info!(
        sites = fleet.sites.len(),
        units = fleet.sites.iter().map(|s| s.endpoints().count()).sum::<usize>(),
        "fleet loaded"
    );

    scheduler.start().await?;
    let state = Arc::new(AppState::new(scheduler.clone(), relay));
    let result = server::serve(&config.listen_addr(), state, CancellationToken::new()).await;

    scheduler.shutdown().await;
    result.map_err(CliError::from)
}
