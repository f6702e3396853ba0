//! UseCase layer: one struct per relay operation.
//!
//! `RelayDispatcher` routes decoded client frames to the use cases and
//! serializes relay events so each one runs to completion.

mod broadcast_payload;
mod dispatcher;
mod error;
mod get_rooms;
mod join_room;
mod leave_room;

pub use broadcast_payload::BroadcastPayloadUseCase;
pub use dispatcher::RelayDispatcher;
pub use error::{BroadcastError, JoinRoomError};
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
