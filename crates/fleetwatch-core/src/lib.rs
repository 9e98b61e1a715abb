// fleetwatch-core: polling, aggregation and call tracking between
// fleetwatch-api and its consumers (CLI and server).

pub mod command;
pub mod config;
pub mod error;
pub mod model;
pub mod poller;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{CommandRelay, RelayCommand, parse_dst_id};
pub use config::{ControlChannelConfig, FleetConfig, SiteConfig, TlsVerification};
pub use error::{CoreError, FetchFailure};
pub use poller::{FleetPoller, PassOutcome, Scheduler};
pub use store::{CallState, CallStateStore};
pub use stream::{BroadcastSink, Subscriber};

pub use model::{
    CallEvent, CallKey, ChannelScope, ControlChannelSnapshot, FleetSnapshot, RepeaterSnapshot,
    SiteSnapshot, UnitAddress, UnitRole,
};

// Unit-level types consumers need without depending on the API crate.
pub use fleetwatch_api::{CommandResponse, ModemStatus, UnitClient, UnitEndpoint, UnitStatus};
