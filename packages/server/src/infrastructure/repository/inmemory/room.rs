//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! 接続レジストリ（ConnectionId → Connection）と Room レジストリ（RoomId → Room）を
//! 1 つの Mutex の内側で管理し、2 つのビューを常に一致させます。
//!
//! インスタンスごとに独立した状態を持つため、テストでは複数のリレーを並べて使えます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, MembershipChange, RepositoryError, Room, RoomId, RoomRepository,
    RoomSummary,
};

#[derive(Debug, Default)]
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<RoomId, Room>,
}

/// インメモリ Room Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryRoomRepository {
    registry: Mutex<Registry>,
}

impl InMemoryRoomRepository {
    /// 空のレジストリで InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn add_member(
        &self,
        connection: Connection,
    ) -> Result<MembershipChange, RepositoryError> {
        let mut registry = self.registry.lock().await;

        if registry.connections.contains_key(&connection.id) {
            return Err(RepositoryError::AlreadyJoined(connection.id.to_string()));
        }

        let room = registry
            .rooms
            .entry(connection.room_id.clone())
            .or_insert_with(|| {
                tracing::debug!("Room '{}' created", connection.room_id);
                Room::new(connection.room_id.clone())
            });
        room.add_member(connection.id);
        let participants = room.participant_count();
        let peers = room.peers_of(&connection.id);

        registry
            .connections
            .insert(connection.id, connection.clone());

        Ok(MembershipChange {
            connection,
            participants,
            peers,
        })
    }

    async fn remove_member(&self, connection_id: &ConnectionId) -> Option<MembershipChange> {
        let mut registry = self.registry.lock().await;

        let connection = registry.connections.remove(connection_id)?;

        let (participants, peers) = match registry.rooms.get_mut(&connection.room_id) {
            Some(room) => {
                room.remove_member(connection_id);
                (room.participant_count(), room.peers_of(connection_id))
            }
            None => (0, Vec::new()),
        };

        if participants == 0 && registry.rooms.remove(&connection.room_id).is_some() {
            tracing::debug!("Room '{}' is empty and was removed", connection.room_id);
        }

        Some(MembershipChange {
            connection,
            participants,
            peers,
        })
    }

    async fn find_connection(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let registry = self.registry.lock().await;
        registry.connections.get(connection_id).cloned()
    }

    async fn find_with_peers(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<(Connection, Vec<ConnectionId>)> {
        let registry = self.registry.lock().await;
        let connection = registry.connections.get(connection_id)?;
        let peers = registry
            .rooms
            .get(&connection.room_id)
            .map(|room| room.peers_of(connection_id))
            .unwrap_or_default();
        Some((connection.clone(), peers))
    }

    async fn list_rooms(&self) -> Vec<RoomSummary> {
        let registry = self.registry.lock().await;
        let mut rooms: Vec<RoomSummary> = registry.rooms.values().map(Room::summary).collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        rooms
    }

    async fn count_connections(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserId, UserName};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomRepository のメンバーシップ操作
    // - 接続レジストリと Room レジストリが常に一致すること
    // - 空になった Room が削除されること
    //
    // 【なぜこのテストが必要か】
    // - 参加者数の表示はこの Repository の数値がそのまま使われる
    // - 古いエントリが残ると、再参加時の参加者数がずれる
    //
    // 【どのようなシナリオをテストするか】
    // 1. 初回参加で Room が作成される
    // 2. 最後のメンバーが抜けると Room が削除される
    // 3. 二重の削除が冪等である
    // 4. 二重の登録が拒否される
    // 5. Room ごとにメンバーが分離される
    // ========================================

    fn connection(room_id: &str, user_id: &str) -> Connection {
        Connection::new(
            ConnectionId::generate(),
            RoomId::new(room_id),
            UserId::new(user_id),
            UserName::new(user_id.to_uppercase()),
        )
    }

    #[tokio::test]
    async fn test_first_join_creates_room() {
        // テスト項目: 未知の room_id への初回参加で Room が作成される
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let alice = connection("r1", "alice");

        // when (操作):
        let change = repo.add_member(alice.clone()).await.unwrap();

        // then (期待する結果):
        assert_eq!(change.participants, 1);
        assert!(change.peers.is_empty());
        assert_eq!(change.connection, alice);
        assert_eq!(
            repo.list_rooms().await,
            vec![RoomSummary {
                room_id: RoomId::new("r1"),
                participants: 1
            }]
        );
    }

    #[tokio::test]
    async fn test_join_reports_existing_members_as_peers() {
        // テスト項目: 参加時に既存メンバーが通知対象として返される
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let alice = connection("r1", "alice");
        let bob = connection("r1", "bob");
        repo.add_member(alice.clone()).await.unwrap();

        // when (操作):
        let change = repo.add_member(bob.clone()).await.unwrap();

        // then (期待する結果):
        assert_eq!(change.participants, 2);
        assert_eq!(change.peers, vec![alice.id]);
    }

    #[tokio::test]
    async fn test_last_leave_removes_room() {
        // テスト項目: 最後のメンバーが抜けると Room がレジストリから削除される
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let alice = connection("r1", "alice");
        repo.add_member(alice.clone()).await.unwrap();

        // when (操作):
        let change = repo.remove_member(&alice.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(change.participants, 0);
        assert!(change.peers.is_empty());
        assert!(repo.list_rooms().await.is_empty());
        assert_eq!(repo.count_connections().await, 0);

        // 同じ room_id への再参加は参加者数 1 から始まる
        let carol = connection("r1", "carol");
        let rejoin = repo.add_member(carol).await.unwrap();
        assert_eq!(rejoin.participants, 1);
    }

    #[tokio::test]
    async fn test_remove_member_twice_is_noop() {
        // テスト項目: 二度目の削除は None を返し、参加者数を減らさない（冪等性）
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let alice = connection("r1", "alice");
        let bob = connection("r1", "bob");
        repo.add_member(alice.clone()).await.unwrap();
        repo.add_member(bob.clone()).await.unwrap();

        // when (操作):
        let first = repo.remove_member(&bob.id).await;
        let second = repo.remove_member(&bob.id).await;

        // then (期待する結果):
        assert_eq!(first.map(|c| c.participants), Some(1));
        assert!(second.is_none());
        assert_eq!(repo.list_rooms().await[0].participants, 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_connection_is_noop() {
        // テスト項目: 未参加の接続の削除はエラーにならない
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();

        // when (操作):
        let result = repo.remove_member(&ConnectionId::generate()).await;

        // then (期待する結果):
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_add_member_twice_is_rejected() {
        // テスト項目: 登録済みの接続の再登録は AlreadyJoined になり、状態は変わらない
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let alice = connection("r1", "alice");
        repo.add_member(alice.clone()).await.unwrap();
        let moved = Connection {
            room_id: RoomId::new("r2"),
            ..alice.clone()
        };

        // when (操作):
        let result = repo.add_member(moved).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::AlreadyJoined(alice.id.to_string()))
        );
        assert_eq!(repo.list_rooms().await.len(), 1);
        assert_eq!(repo.find_connection(&alice.id).await, Some(alice));
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        // テスト項目: 別の Room のメンバーは通知対象に含まれない
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let alice = connection("r1", "alice");
        let bob = connection("r1", "bob");
        let carol = connection("r2", "carol");
        repo.add_member(alice.clone()).await.unwrap();
        repo.add_member(bob.clone()).await.unwrap();
        repo.add_member(carol.clone()).await.unwrap();

        // when (操作):
        let (found, peers) = repo.find_with_peers(&alice.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(found, alice);
        assert_eq!(peers, vec![bob.id]);
        let rooms = repo.list_rooms().await;
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_id.as_str(), "r1");
        assert_eq!(rooms[0].participants, 2);
        assert_eq!(rooms[1].room_id.as_str(), "r2");
        assert_eq!(rooms[1].participants, 1);
    }
}
