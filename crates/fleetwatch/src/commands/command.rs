//! `fleetwatch command`: relay one command without starting the server.

use fleetwatch::output::{print_output, render_value};
use fleetwatch_core::{CommandRelay, CoreError, RelayCommand, UnitClient};
use secrecy::SecretString;

use super::config_or_default;
use crate::cli::{CommandArgs, GlobalOpts};
use crate::error::CliError;

pub async fn handle(args: CommandArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = config_or_default(&global.config, args.password.is_some())?;
    let fleet = config.to_fleet_config();
    let client = UnitClient::new(&fleet.transport()).map_err(CoreError::from)?;
    let relay = CommandRelay::new(client, &fleet);

    let cmd = RelayCommand {
        command: args.command,
        address: args.address,
        port: args.port,
        password: args.password.map(SecretString::from),
        dst_id: args.dst_id,
    };
    let response = relay.relay(&cmd).await?;
    print_output(&render_value(args.output, &response), global.quiet);
    Ok(())
}
