//! UseCase: Room 参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 参加の登録、参加者本人への `joined`、既存メンバーへの `user-joined`
//!
//! ### なぜこのテストが必要か
//! - 参加者本人と既存メンバーで受け取るメッセージが異なる
//! - 参加者数は参加者本人を含んだ値でなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：空の Room への参加（通知対象なし）
//! - 正常系：既存メンバーがいる Room への参加
//! - 異常系：登録済みの接続による二重登録

use std::sync::Arc;

use kokuban_shared::protocol::ServerMessage;

use crate::domain::{Connection, MembershipChange, MessagePusher, RoomRepository};

use super::error::JoinRoomError;

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（メンバーシップ管理の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Room 参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 参加する接続（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Ok(MembershipChange)` - 参加後の参加者数と通知対象
    /// * `Err(JoinRoomError)` - 接続が既に参加済み
    pub async fn execute(&self, connection: Connection) -> Result<MembershipChange, JoinRoomError> {
        // 1. Repository に登録
        let change = self.repository.add_member(connection).await?;

        // 2. 参加者本人に参加者数を通知
        let joined = ServerMessage::Joined {
            room_id: change.connection.room_id.as_str().to_string(),
            participants: change.participants,
        }
        .to_json()?;
        if let Err(e) = self
            .message_pusher
            .push_to(&change.connection.id, &joined)
            .await
        {
            tracing::warn!(
                "Failed to acknowledge join of '{}': {}",
                change.connection.id,
                e
            );
        }

        // 3. 既存メンバーに user-joined をブロードキャスト
        if !change.peers.is_empty() {
            let user_joined = ServerMessage::UserJoined {
                user_id: change.connection.user_id.as_str().to_string(),
                user_name: change.connection.user_name.as_str().to_string(),
                participants: change.participants,
            }
            .to_json()?;
            if let Err(e) = self
                .message_pusher
                .broadcast(change.peers.clone(), &user_joined)
                .await
            {
                tracing::warn!("Failed to broadcast user-joined: {}", e);
            }
        }

        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionId, MockMessagePusher, RepositoryError, RoomId, UserId, UserName},
        infrastructure::repository::InMemoryRoomRepository,
    };

    fn connection(room_id: &str, user_id: &str, user_name: &str) -> Connection {
        Connection::new(
            ConnectionId::generate(),
            RoomId::new(room_id),
            UserId::new(user_id),
            UserName::new(user_name),
        )
    }

    #[tokio::test]
    async fn test_join_empty_room_only_acknowledges_caller() {
        // テスト項目: 空の Room への参加では本人にだけ joined が送られる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let alice = connection("room-42", "u1", "Alice");
        let alice_id = alice.id.to_string();

        let mut message_pusher = MockMessagePusher::new();
        message_pusher
            .expect_push_to()
            .withf(move |id, content| {
                id.to_string() == alice_id
                    && content.contains(r#""type":"joined""#)
                    && content.contains(r#""participants":1"#)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        message_pusher.expect_broadcast().times(0);

        let usecase = JoinRoomUseCase::new(repository.clone(), Arc::new(message_pusher));

        // when (操作):
        let result = usecase.execute(alice).await;

        // then (期待する結果):
        let change = result.unwrap();
        assert_eq!(change.participants, 1);
        assert_eq!(repository.count_connections().await, 1);
    }

    #[tokio::test]
    async fn test_join_notifies_existing_members() {
        // テスト項目: 既存メンバーには新しい参加者数で user-joined が送られる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let alice = connection("room-42", "u1", "Alice");
        let bob = connection("room-42", "u2", "Bob");
        let alice_id = alice.id.to_string();
        repository.add_member(alice).await.unwrap();

        let mut message_pusher = MockMessagePusher::new();
        message_pusher
            .expect_push_to()
            .times(1)
            .returning(|_, _| Ok(()));
        message_pusher
            .expect_broadcast()
            .withf(move |targets, content| {
                targets.len() == 1
                    && targets[0].to_string() == alice_id
                    && content.contains(r#""type":"user-joined""#)
                    && content.contains(r#""userName":"Bob""#)
                    && content.contains(r#""participants":2"#)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = JoinRoomUseCase::new(repository.clone(), Arc::new(message_pusher));

        // when (操作):
        let result = usecase.execute(bob).await;

        // then (期待する結果):
        assert_eq!(result.unwrap().participants, 2);
    }

    #[tokio::test]
    async fn test_join_twice_is_rejected_without_notifications() {
        // テスト項目: 参加済みの接続の再登録はエラーになり、通知は送られない
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let alice = connection("room-42", "u1", "Alice");
        repository.add_member(alice.clone()).await.unwrap();

        let mut message_pusher = MockMessagePusher::new();
        message_pusher.expect_push_to().times(0);
        message_pusher.expect_broadcast().times(0);

        let usecase = JoinRoomUseCase::new(repository.clone(), Arc::new(message_pusher));

        // when (操作):
        let result = usecase.execute(alice.clone()).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinRoomError::Repository(RepositoryError::AlreadyJoined(
                alice.id.to_string()
            )))
        );
    }

    #[tokio::test]
    async fn test_join_succeeds_even_if_ack_fails() {
        // テスト項目: 本人への送信に失敗しても参加は成立する
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let alice = connection("room-42", "u1", "Alice");

        let mut message_pusher = MockMessagePusher::new();
        message_pusher.expect_push_to().times(1).returning(|id, _| {
            Err(crate::domain::MessagePushError::ClientNotFound(
                id.to_string(),
            ))
        });

        let usecase = JoinRoomUseCase::new(repository.clone(), Arc::new(message_pusher));

        // when (操作):
        let result = usecase.execute(alice).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(repository.count_connections().await, 1);
    }
}
