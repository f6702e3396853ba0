//! Error types for the relay client.

use kokuban_shared::protocol::ProtocolError;
use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An outbound frame could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] ProtocolError),
}
