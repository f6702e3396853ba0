//! MessagePusher trait 定義
//!
//! クライアントへのメッセージ送信（通知）のインターフェース。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// トランスポートへ送るフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// JSON テキストフレーム
    Text(String),
    /// ハートビート用の ping
    Ping,
}

/// 1 つのトランスポートへの送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<OutboundFrame>;

/// MessagePusher trait
///
/// UseCase 層はこの trait に依存し、送信手段の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// トランスポートを登録（接続受付時）
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// トランスポートを登録解除（切断時）
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続にメッセージを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にメッセージを送信
    ///
    /// 閉じているトランスポートはスキップする。部分的な失敗はエラーにしない。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 開いている全トランスポートに ping を送信し、送信数を返す
    async fn ping_all(&self) -> usize;
}
