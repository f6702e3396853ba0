//! Relay wire protocol.
//!
//! Every frame is a JSON text message carrying a `type` discriminator.
//! Payloads under `data` are opaque to the relay and forwarded byte for byte.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, value::RawValue};
use thiserror::Error;

/// Frame types accepted from clients.
const CLIENT_MESSAGE_TYPES: [&str; 3] = ["join", "broadcast", "leave"];

/// Frame types emitted by the server.
const SERVER_MESSAGE_TYPES: [&str; 4] = ["joined", "user-joined", "user-left", "broadcast"];

/// Errors raised while decoding a frame.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The frame is not valid JSON or does not match the message shape
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The frame carries a `type` this side does not handle
    #[error("unknown message type '{0}'")]
    UnknownType(String),
}

/// Broadcast payload kept as the exact JSON text the sender wrote.
///
/// Numbers, key order and whitespace inside the payload survive the relay
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Box<RawValue>);

impl Payload {
    pub fn null() -> Self {
        Self(RawValue::NULL.to_owned())
    }

    /// Wrap JSON text, rejecting anything that is not a single JSON value.
    pub fn from_json(json: impl Into<String>) -> Result<Self, ProtocolError> {
        RawValue::from_string(json.into())
            .map(Self)
            .map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    pub fn from_value(value: &Value) -> Result<Self, ProtocolError> {
        serde_json::value::to_raw_value(value)
            .map(Self)
            .map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.get()
    }

    /// Parse the payload for local use.
    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        serde_json::from_str(self.as_str()).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::null()
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client → server messages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Join {
        room_id: String,
        user_id: String,
        user_name: String,
    },
    Broadcast { data: Payload },
    Leave,
}

/// Server → client messages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Acknowledgment sent to the joining connection only
    #[serde(rename_all = "camelCase")]
    Joined { room_id: String, participants: usize },

    #[serde(rename_all = "camelCase")]
    UserJoined {
        user_id: String,
        user_name: String,
        participants: usize,
    },

    #[serde(rename_all = "camelCase")]
    UserLeft {
        user_id: String,
        user_name: String,
        participants: usize,
    },

    /// Payload relayed from another member of the room
    #[serde(rename_all = "camelCase")]
    Broadcast {
        data: Payload,
        user_id: String,
        user_name: String,
    },
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

// Frame bodies are decoded straight from the text. Going through serde's
// internally tagged enums would buffer `data` and lose the raw payload.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinFrame {
    room_id: String,
    user_id: String,
    user_name: String,
}

#[derive(Deserialize)]
struct ClientBroadcastFrame {
    #[serde(default)]
    data: Option<Payload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinedFrame {
    room_id: String,
    participants: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresenceFrame {
    user_id: String,
    user_name: String,
    participants: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerBroadcastFrame {
    #[serde(default)]
    data: Option<Payload>,
    user_id: String,
    user_name: String,
}

/// Decode a client frame, separating unknown `type` values from malformed input.
pub fn decode_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    let message = match message_type(text, &CLIENT_MESSAGE_TYPES)?.as_str() {
        "join" => {
            let frame: JoinFrame = body(text)?;
            ClientMessage::Join {
                room_id: frame.room_id,
                user_id: frame.user_id,
                user_name: frame.user_name,
            }
        }
        "broadcast" => {
            let frame: ClientBroadcastFrame = body(text)?;
            ClientMessage::Broadcast {
                data: frame.data.unwrap_or_default(),
            }
        }
        _ => ClientMessage::Leave,
    };
    Ok(message)
}

/// Decode a server frame, separating unknown `type` values from malformed input.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    let message = match message_type(text, &SERVER_MESSAGE_TYPES)?.as_str() {
        "joined" => {
            let frame: JoinedFrame = body(text)?;
            ServerMessage::Joined {
                room_id: frame.room_id,
                participants: frame.participants,
            }
        }
        "user-joined" => {
            let frame: PresenceFrame = body(text)?;
            ServerMessage::UserJoined {
                user_id: frame.user_id,
                user_name: frame.user_name,
                participants: frame.participants,
            }
        }
        "user-left" => {
            let frame: PresenceFrame = body(text)?;
            ServerMessage::UserLeft {
                user_id: frame.user_id,
                user_name: frame.user_name,
                participants: frame.participants,
            }
        }
        _ => {
            let frame: ServerBroadcastFrame = body(text)?;
            ServerMessage::Broadcast {
                data: frame.data.unwrap_or_default(),
                user_id: frame.user_id,
                user_name: frame.user_name,
            }
        }
    };
    Ok(message)
}

/// Read the `type` discriminator and check it against the accepted set.
fn message_type(text: &str, known_types: &[&str]) -> Result<String, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    let message_type = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::Malformed("missing string field 'type'".to_string()))?;

    if !known_types.contains(&message_type) {
        return Err(ProtocolError::UnknownType(message_type.to_string()));
    }

    Ok(message_type.to_string())
}

fn body<'a, T>(text: &'a str) -> Result<T, ProtocolError>
where
    T: Deserialize<'a>,
{
    serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
}
