//! UseCase: ペイロードのブロードキャスト処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastPayloadUseCase::execute() メソッド
//! - 送信者以外の同じ Room のメンバーへのファンアウト
//!
//! ### なぜこのテストが必要か
//! - 送信者に自分のブロードキャストが返ってはならない
//! - join 前のブロードキャストは誰にも届いてはならない
//! - ペイロードは解釈されずにそのまま転送されなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 人の Room でのブロードキャスト
//! - 異常系：join 前のブロードキャスト
//! - エッジケース：送信者しかいない Room（通知対象なし）

use std::sync::Arc;

use kokuban_shared::protocol::{Payload, ServerMessage};

use crate::domain::{ConnectionId, MessagePusher, RoomRepository};

use super::error::BroadcastError;

/// ブロードキャストのユースケース
pub struct BroadcastPayloadUseCase {
    /// Repository（メンバーシップ管理の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl BroadcastPayloadUseCase {
    /// 新しい BroadcastPayloadUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// ブロードキャストを実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者の接続 ID
    /// * `data` - 転送するペイロード（解釈しない）
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - 転送先の接続 ID リスト
    /// * `Err(BroadcastError::NotJoined)` - 送信者が join していない
    pub async fn execute(
        &self,
        sender_id: &ConnectionId,
        data: Payload,
    ) -> Result<Vec<ConnectionId>, BroadcastError> {
        // 1. 送信者と転送先を取得
        let (sender, peers) = self
            .repository
            .find_with_peers(sender_id)
            .await
            .ok_or(BroadcastError::NotJoined)?;

        if peers.is_empty() {
            return Ok(peers);
        }

        // 2. 送信者の情報を付けて転送
        let message = ServerMessage::Broadcast {
            data,
            user_id: sender.user_id.into_string(),
            user_name: sender.user_name.into_string(),
        }
        .to_json()?;

        self.message_pusher
            .broadcast(peers.clone(), &message)
            .await
            .map_err(|e| BroadcastError::BroadcastFailed(e.to_string()))?;

        Ok(peers)
    }
}
