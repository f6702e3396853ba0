//! メッセージ送信（通知とハートビート）の実装
//!
//! - `websocket`: 接続ごとの mpsc チャネル経由で WebSocket に書き込む実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
