//! Dependency wiring for the in-memory relay.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::Server,
    usecase::{
        BroadcastPayloadUseCase, GetRoomsUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        RelayDispatcher,
    },
};

/// Build a relay server backed by in-memory registries.
///
/// Every call creates independent registries, so several relays can run in
/// one process.
pub fn in_memory_server(heartbeat_interval: Duration) -> Server {
    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. Dispatcher
    // 5. Server

    // 1. Create Repository (in-memory registry)
    let repository = Arc::new(InMemoryRoomRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));

    // 3. Create UseCases
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let broadcast_payload_usecase = Arc::new(BroadcastPayloadUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(repository.clone()));

    // 4. Create Dispatcher
    let dispatcher = Arc::new(RelayDispatcher::new(
        join_room_usecase,
        leave_room_usecase,
        broadcast_payload_usecase,
        repository,
        message_pusher.clone(),
    ));

    // 5. Create Server
    Server::new(dispatcher, get_rooms_usecase, message_pusher)
        .with_heartbeat_interval(heartbeat_interval)
}
