//! WebSocket relay server: HTTP routing and socket handling.

mod error;
mod handler;
mod heartbeat;
mod server;
mod signal;
pub mod state;

pub use error::ServerError;
pub use heartbeat::{DEFAULT_HEARTBEAT_INTERVAL, MIN_HEARTBEAT_INTERVAL, spawn_heartbeat};
pub use server::Server;
