//! Shared library for the Kokuban relay server and client.
//!
//! - `logger`: tracing subscriber setup for the binaries
//! - `protocol`: JSON text frames exchanged over the relay WebSocket

pub mod logger;
pub mod protocol;
