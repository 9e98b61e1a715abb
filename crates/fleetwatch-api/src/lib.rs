// fleetwatch-api: async client for per-unit radio network REST endpoints

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{UnitClient, UnitEndpoint};
pub use error::Error;
pub use models::{CommandRequest, CommandResponse, ModemStatus, UnitStatus};
pub use transport::{Scheme, TlsMode, TransportConfig};
