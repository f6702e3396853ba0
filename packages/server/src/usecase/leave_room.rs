//! UseCase: Room 退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - 明示的な leave と切断の両方で使われる退出処理
//!
//! ### なぜこのテストが必要か
//! - 残りのメンバーに更新後の参加者数が通知されることを保証
//! - leave の後に切断が続いても二重に減算されないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：メンバーが残る Room からの退出
//! - エッジケース：最後のメンバーの退出（通知対象なし）
//! - エッジケース：未参加・退出済みの接続（何もしない）

use std::sync::Arc;

use kokuban_shared::protocol::ServerMessage;

use crate::domain::{ConnectionId, MembershipChange, MessagePusher, RoomRepository};

/// Room 退出のユースケース
pub struct LeaveRoomUseCase {
    /// Repository（メンバーシップ管理の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Room 退出を実行
    ///
    /// # Returns
    ///
    /// * `Some(MembershipChange)` - 退出した接続と残りの参加者数
    /// * `None` - 接続が参加していなかった（何もしない）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<MembershipChange> {
        // 1. Repository から削除（空になった Room は Repository が削除する）
        let change = self.repository.remove_member(connection_id).await?;

        // 2. 残りのメンバーに user-left をブロードキャスト
        if !change.peers.is_empty() {
            let user_left = ServerMessage::UserLeft {
                user_id: change.connection.user_id.as_str().to_string(),
                user_name: change.connection.user_name.as_str().to_string(),
                participants: change.participants,
            };
            match user_left.to_json() {
                Ok(json) => {
                    if let Err(e) = self
                        .message_pusher
                        .broadcast(change.peers.clone(), &json)
                        .await
                    {
                        tracing::warn!("Failed to broadcast user-left: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Failed to encode user-left: {}", e),
            }
        }

        Some(change)
    }
}
