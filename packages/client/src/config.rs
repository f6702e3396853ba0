//! Client configuration.

use kokuban_shared::protocol::ClientMessage;

use crate::domain::ReconnectPolicy;

/// Endpoint and identity of one relay membership.
///
/// The identifiers are fixed for the lifetime of a [`crate::RelayClient`];
/// joining another room means starting a new client.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayClientConfig {
    pub url: String,
    pub room_id: String,
    pub user_id: String,
    pub user_name: String,
    pub reconnect_policy: ReconnectPolicy,
}

impl RelayClientConfig {
    pub fn new(
        url: impl Into<String>,
        room_id: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            room_id: room_id.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            reconnect_policy: ReconnectPolicy::default(),
        }
    }

    pub fn with_reconnect_policy(mut self, reconnect_policy: ReconnectPolicy) -> Self {
        self.reconnect_policy = reconnect_policy;
        self
    }

    /// The handshake frame sent on every newly opened transport.
    pub fn join_message(&self) -> ClientMessage {
        ClientMessage::Join {
            room_id: self.room_id.clone(),
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_uses_fixed_reconnect_delay() {
        // テスト項目: 既定の再接続ポリシーは 3 秒固定
        // given (前提条件):
        let config = RelayClientConfig::new("ws://127.0.0.1:8080/ws", "r1", "u1", "Alice");

        // when (操作):
        let policy = config.reconnect_policy;

        // then (期待する結果):
        assert_eq!(policy, ReconnectPolicy::Fixed(Duration::from_secs(3)));
    }

    #[test]
    fn test_join_message_carries_identifiers() {
        // テスト項目: join メッセージに Room とユーザーの識別子が入る
        // given (前提条件):
        let config = RelayClientConfig::new("ws://127.0.0.1:8080/ws", "room-42", "u1", "Alice");

        // when (操作):
        let json = config.join_message().to_json().unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            r#"{"type":"join","roomId":"room-42","userId":"u1","userName":"Alice"}"#
        );
    }
}
