//! Domain layer errors.

use thiserror::Error;

/// Errors raised by a [`RoomRepository`](super::RoomRepository)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The connection already holds a membership
    #[error("connection '{0}' has already joined a room")]
    AlreadyJoined(String),
}

/// Errors raised by a [`MessagePusher`](super::MessagePusher)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessagePushError {
    /// No transport is registered for the connection
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    /// The transport channel is closed
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
