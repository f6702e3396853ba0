//! Data Transfer Objects (DTOs) for the relay server.
//!
//! WebSocket frames live in `kokuban_shared::protocol`; this module holds the
//! HTTP API response DTOs and their conversions from domain entities.

pub mod conversion;
pub mod http;
