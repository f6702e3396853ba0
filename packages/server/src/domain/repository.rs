//! Repository trait 定義
//!
//! ドメイン層が必要とするメンバーシップ管理のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Connection, ConnectionId, MembershipChange, RepositoryError, RoomSummary};

/// Room Repository trait
///
/// 接続 → Room と Room → メンバーの 2 つのビューを一貫して管理する。
/// 各メソッドは 1 回のロックで完結し、2 つのビューが食い違うことはない。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 接続を Room に登録する
    ///
    /// Room が存在しなければ作成する。既に登録済みの接続は
    /// `RepositoryError::AlreadyJoined` になる。
    async fn add_member(
        &self,
        connection: Connection,
    ) -> Result<MembershipChange, RepositoryError>;

    /// 接続を両方のビューから削除する
    ///
    /// 未登録の接続は `None`（冪等）。Room が空になれば Room ごと削除する。
    async fn remove_member(&self, connection_id: &ConnectionId) -> Option<MembershipChange>;

    /// 登録済みの接続を取得
    async fn find_connection(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// 接続と、同じ Room の他のメンバーを取得
    async fn find_with_peers(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<(Connection, Vec<ConnectionId>)>;

    /// 存在する全ての Room の概要を取得（room_id 順）
    async fn list_rooms(&self) -> Vec<RoomSummary>;

    /// 登録済みの接続数を取得
    async fn count_connections(&self) -> usize;
}
