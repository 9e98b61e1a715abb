// ── Cross-pass state ──
//
// The only state the engine carries from one pass to the next.

mod call_state;

pub use call_state::{CallState, CallStateStore};
