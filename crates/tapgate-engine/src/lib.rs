//! TapGate Engine - Command handlers with boundary logging
//!
//! Wires the core decision engine to the SQLite store and the device
//! dispatcher:
//!
//! - Tag-event processing (the inbound badge-tap surface)
//! - Reader API-key resolution
//! - Mapping administration (replace, auto-map, admin view)
//! - The batch device dispatcher: concurrent per-device fan-out with a
//!   bounded deadline over a pluggable command transport

pub mod commands;
pub mod dispatcher;
pub mod transport;

pub use dispatcher::NfcDispatcher;
pub use transport::{CommandTransport, TcpTransport, TransportFault};
