//! Clap derive structures for the `fleetwatch` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fleetwatch::output::OutputFormat;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fleetwatch -- live status and call activity for P25 radio fleets
#[derive(Debug, Parser)]
#[command(
    name = "fleetwatch",
    version,
    about = "Poll a fleet of P25 units and stream their status",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Deployment file describing sites and units
    #[arg(
        long,
        short = 'c',
        env = "FLEETWATCH_CONFIG",
        default_value = fleetwatch_config::DEFAULT_CONFIG_PATH,
        global = true
    )]
    pub config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, env = "FLEETWATCH_LOG_JSON", global = true)]
    pub log_json: bool,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll continuously and serve the WebSocket feed and command relay
    Serve(ServeArgs),

    /// Run one fleet pass and print it
    Poll(PollArgs),

    /// Send one command to a unit
    #[command(name = "command", alias = "cmd")]
    Command(CommandArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides the config file)
    #[arg(long)]
    pub address: Option<String>,

    /// Listen port (overrides the config file)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Args)]
pub struct PollArgs {
    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CommandArgs {
    /// Unit REST address
    #[arg(long)]
    pub address: String,

    /// Unit REST port
    #[arg(long)]
    pub port: u16,

    /// Unit password (looked up in the config file when omitted)
    #[arg(long, env = "FLEETWATCH_UNIT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Command name, e.g. `page` or `check`
    #[arg(long)]
    pub command: String,

    /// Destination radio id
    #[arg(long, default_value_t = 0)]
    pub dst_id: u32,

    /// Output format
    #[arg(long, short = 'o', default_value = "json")]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
