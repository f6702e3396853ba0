//! Server state shared by the handlers.

use std::sync::Arc;

use crate::usecase::{GetRoomsUseCase, RelayDispatcher};

/// Shared application state
pub struct AppState {
    /// RelayDispatcher（リレーイベントの処理）
    pub dispatcher: Arc<RelayDispatcher>,
    /// GetRoomsUseCase（Room 一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
}
