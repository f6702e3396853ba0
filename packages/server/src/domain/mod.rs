//! Domain layer for the room relay.
//!
//! This module contains the membership model and the interfaces the use cases
//! depend on. It knows nothing about WebSocket or JSON.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Connection, MembershipChange, Room, RoomSummary};
pub use error::{MessagePushError, RepositoryError};
pub use message_pusher::{MessagePusher, OutboundFrame, PusherChannel};
pub use repository::RoomRepository;
pub use value_object::{ConnectionId, RoomId, UserId, UserName};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
