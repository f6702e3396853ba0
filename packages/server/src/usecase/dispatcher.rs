//! Relay event dispatcher.
//!
//! Every relay event (transport open, inbound frame, transport close) goes
//! through [`RelayDispatcher`]. Events are serialized by the event gate, so a
//! membership mutation and its fan-out complete before the next event starts
//! and every peer observes notifications in processing order.

use std::sync::Arc;

use kokuban_shared::protocol::{ClientMessage, ProtocolError, decode_client_message};
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, MessagePusher, PusherChannel, RoomId, RoomRepository, UserId,
    UserName,
};

use super::{BroadcastError, BroadcastPayloadUseCase, JoinRoomUseCase, LeaveRoomUseCase};

pub struct RelayDispatcher {
    join_room_usecase: Arc<JoinRoomUseCase>,
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    broadcast_payload_usecase: Arc<BroadcastPayloadUseCase>,
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    event_gate: Mutex<()>,
}

impl RelayDispatcher {
    pub fn new(
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        broadcast_payload_usecase: Arc<BroadcastPayloadUseCase>,
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            join_room_usecase,
            leave_room_usecase,
            broadcast_payload_usecase,
            repository,
            message_pusher,
            event_gate: Mutex::new(()),
        }
    }

    /// Register a freshly accepted transport.
    ///
    /// The transport receives heartbeats from now on but is not a room member
    /// until it sends `join`.
    pub async fn open(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let _gate = self.event_gate.lock().await;
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
        tracing::info!("Connection '{}' opened", connection_id);
    }

    /// Decode and route one inbound text frame.
    ///
    /// Malformed frames and unknown types are logged and dropped.
    pub async fn handle_text(&self, connection_id: ConnectionId, text: &str) {
        match decode_client_message(text) {
            Ok(message) => self.handle_message(connection_id, message).await,
            Err(ProtocolError::UnknownType(message_type)) => {
                tracing::warn!(
                    "Ignoring message of unknown type '{}' from '{}'",
                    message_type,
                    connection_id
                );
            }
            Err(e) => {
                tracing::warn!("Dropping malformed message from '{}': {}", connection_id, e);
            }
        }
    }

    pub async fn handle_message(&self, connection_id: ConnectionId, message: ClientMessage) {
        let _gate = self.event_gate.lock().await;

        match message {
            ClientMessage::Join {
                room_id,
                user_id,
                user_name,
            } => {
                self.join(connection_id, room_id, user_id, user_name).await;
            }
            ClientMessage::Broadcast { data } => {
                match self
                    .broadcast_payload_usecase
                    .execute(&connection_id, data)
                    .await
                {
                    Ok(targets) => {
                        tracing::debug!(
                            "Relayed broadcast from '{}' to {} peer(s)",
                            connection_id,
                            targets.len()
                        );
                    }
                    Err(BroadcastError::NotJoined) => {
                        tracing::debug!(
                            "Dropping broadcast from '{}' before join",
                            connection_id
                        );
                    }
                    Err(e) => {
                        tracing::warn!("Failed to relay broadcast from '{}': {}", connection_id, e);
                    }
                }
            }
            ClientMessage::Leave => {
                self.leave(&connection_id).await;
            }
        }
    }

    /// Tear down a transport after close or error.
    ///
    /// Safe to call after an explicit `leave`.
    pub async fn close(&self, connection_id: ConnectionId) {
        let _gate = self.event_gate.lock().await;
        self.leave(&connection_id).await;
        self.message_pusher.unregister_client(&connection_id).await;
        tracing::info!("Connection '{}' closed", connection_id);
    }

    async fn join(
        &self,
        connection_id: ConnectionId,
        room_id: String,
        user_id: String,
        user_name: String,
    ) {
        // A second join is an explicit leave of the previous membership first.
        if self
            .repository
            .find_connection(&connection_id)
            .await
            .is_some()
        {
            tracing::info!(
                "Connection '{}' joined again, leaving its previous room first",
                connection_id
            );
            self.leave(&connection_id).await;
        }

        let connection = Connection::new(
            connection_id,
            RoomId::new(room_id),
            UserId::new(user_id),
            UserName::new(user_name),
        );
        match self.join_room_usecase.execute(connection).await {
            Ok(change) => {
                tracing::info!(
                    "'{}' ({}) joined room '{}' ({} participant(s))",
                    change.connection.user_name,
                    change.connection.user_id,
                    change.connection.room_id,
                    change.participants
                );
            }
            Err(e) => {
                tracing::warn!("Failed to join '{}': {}", connection_id, e);
            }
        }
    }

    async fn leave(&self, connection_id: &ConnectionId) {
        if let Some(change) = self.leave_room_usecase.execute(connection_id).await {
            tracing::info!(
                "'{}' ({}) left room '{}' ({} participant(s) remaining)",
                change.connection.user_name,
                change.connection.user_id,
                change.connection.room_id,
                change.participants
            );
        }
    }
}
