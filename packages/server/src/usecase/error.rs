//! UseCase layer errors.

use kokuban_shared::protocol::ProtocolError;
use thiserror::Error;

use crate::domain::RepositoryError;

/// Errors from [`JoinRoomUseCase`](super::JoinRoomUseCase)
#[derive(Debug, Error, PartialEq)]
pub enum JoinRoomError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to encode notification: {0}")]
    Encoding(#[from] ProtocolError),
}

/// Errors from [`BroadcastPayloadUseCase`](super::BroadcastPayloadUseCase)
#[derive(Debug, Error, PartialEq)]
pub enum BroadcastError {
    /// The sender has not completed `join`
    #[error("connection has not joined a room")]
    NotJoined,

    #[error("failed to encode broadcast: {0}")]
    Encoding(#[from] ProtocolError),

    #[error("failed to broadcast: {0}")]
    BroadcastFailed(String),
}
