//! Kokuban room relay server.
//!
//! Groups WebSocket clients into rooms, relays opaque broadcast payloads
//! between room members and notifies them of presence changes.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// wiring
pub mod bootstrap;
