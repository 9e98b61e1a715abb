//! `fleetwatch poll`: one pass, printed.

use fleetwatch::output::{print_output, render_snapshot};
use fleetwatch_config::load_config;
use fleetwatch_core::FleetPoller;

use crate::cli::{GlobalOpts, PollArgs};
use crate::error::CliError;

pub async fn handle(args: &PollArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = load_config(&global.config)?;
    let poller = FleetPoller::new(&config.to_fleet_config())?;

    let outcome = poller.run_pass().await;
    print_output(&render_snapshot(args.output, &outcome.snapshot), global.quiet);

    if outcome.is_degraded() {
        let details = outcome
            .failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        return Err(CliError::Degraded {
            failed: outcome.failures.len(),
            details,
        });
    }
    Ok(())
}
