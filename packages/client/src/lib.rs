//! Kokuban relay client.
//!
//! [`RelayClient`] keeps one room membership alive against a relay server:
//! it performs the join handshake, reconnects after drops and exposes the
//! connection status and participant count to the embedding application.

pub mod callbacks;
pub mod config;
pub mod domain;
pub mod error;
pub mod formatter;
mod manager;
mod session;
pub mod ui;

pub use callbacks::{CallbackCell, RelayCallbacks};
pub use config::RelayClientConfig;
pub use domain::{ConnectionStatus, ReconnectPolicy, SessionState};
pub use error::ClientError;
pub use manager::RelayClient;
