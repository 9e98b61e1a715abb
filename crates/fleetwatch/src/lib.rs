//! fleetwatch server and rendering pieces shared by the binary and its
//! integration tests.

pub mod output;
pub mod server;
