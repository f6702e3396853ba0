//! Axum handlers: the relay socket and the read-only HTTP API.

pub mod http;
pub mod websocket;
