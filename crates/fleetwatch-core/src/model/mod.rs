// ── Domain model ──
//
// Snapshot types handed to subscribers and the call-activity types the
// tracker emits. Everything here is plain data; behaviour lives in the
// store and poller modules.

pub mod call;
pub mod snapshot;

pub use call::{CallEvent, CallKey, ChannelScope};
pub use snapshot::{
    ControlChannelSnapshot, FleetSnapshot, RepeaterSnapshot, SiteSnapshot, UnitAddress, UnitRole,
};
