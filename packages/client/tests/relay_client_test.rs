//! Integration tests for the relay client against a real relay and a scripted one.

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use kokuban_client::{RelayCallbacks, RelayClient, RelayClientConfig, SessionState};
use kokuban_server::bootstrap::in_memory_server;
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
    task::JoinHandle,
    time::timeout,
};
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};

const WAIT: Duration = Duration::from_secs(5);

/// Helper struct to manage a real relay on an ephemeral port
struct TestServer {
    handle: JoinHandle<()>,
    url: String,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        let server = in_memory_server(Duration::from_secs(30));
        let handle = tokio::spawn(async move {
            let _ = server
                .serve_with_shutdown(listener, std::future::pending())
                .await;
        });
        TestServer { handle, url }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A relay whose side of the protocol is driven by the test
struct ScriptedRelay {
    listener: TcpListener,
    url: String,
}

impl ScriptedRelay {
    async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        ScriptedRelay { listener, url }
    }

    async fn accept(&self) -> WebSocketStream<TcpStream> {
        let (stream, _) = self.listener.accept().await.expect("Failed to accept");
        accept_async(stream).await.expect("Handshake failed")
    }

    /// Accept a connection and acknowledge its join
    async fn accept_and_join(&self, participants: usize) -> (WebSocketStream<TcpStream>, Value) {
        let mut ws = timeout(WAIT, self.accept())
            .await
            .expect("Client did not connect");
        let join = next_json(&mut ws).await;
        send_json(
            &mut ws,
            json!({"type": "joined", "roomId": join["roomId"], "participants": participants}),
        )
        .await;
        (ws, join)
    }
}

async fn next_json(ws: &mut WebSocketStream<TcpStream>) -> Value {
    loop {
        let message = timeout(WAIT, ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).expect("Invalid JSON from client");
        }
    }
}

async fn send_json(ws: &mut WebSocketStream<TcpStream>, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("Failed to send");
}

async fn wait_for_state(client: &RelayClient, predicate: impl FnMut(&SessionState) -> bool) -> bool {
    let mut state = client.subscribe();
    matches!(timeout(WAIT, state.wait_for(predicate)).await, Ok(Ok(_)))
}

type Received = (Value, String, String);

fn message_channel() -> (RelayCallbacks, mpsc::UnboundedReceiver<Received>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callbacks = RelayCallbacks::new().on_message(move |data, user_id, user_name| {
        let _ = tx.send((data, user_id.to_string(), user_name.to_string()));
    });
    (callbacks, rx)
}

#[tokio::test]
async fn test_broadcast_between_two_clients() {
    // テスト項目: A のブロードキャストが B の on_message に届き、A には返ってこない
    // given (前提条件):
    let server = TestServer::start().await;
    let (a_callbacks, mut a_rx) = message_channel();
    let (b_callbacks, mut b_rx) = message_channel();
    let a = RelayClient::start(
        RelayClientConfig::new(&server.url, "room-42", "u1", "Alice"),
        a_callbacks,
    );
    assert!(wait_for_state(&a, |s| s.is_connected() && s.participants == 1).await);
    let b = RelayClient::start(
        RelayClientConfig::new(&server.url, "room-42", "u2", "Bob"),
        b_callbacks,
    );
    assert!(wait_for_state(&b, |s| s.is_connected() && s.participants == 2).await);
    assert!(wait_for_state(&a, |s| s.participants == 2).await);

    // when (操作):
    let sent = a.broadcast(json!({"x": 1}));

    // then (期待する結果):
    assert!(sent);
    let received = timeout(WAIT, b_rx.recv()).await.unwrap().unwrap();
    assert_eq!(
        received,
        (json!({"x": 1}), "u1".to_string(), "Alice".to_string())
    );
    assert!(
        timeout(Duration::from_millis(300), a_rx.recv())
            .await
            .is_err()
    );

    a.shutdown().await;
    b.shutdown().await;
}

#[tokio::test]
async fn test_presence_callbacks_track_participants() {
    // テスト項目: 他の参加者の出入りで参加者数が更新され、コールバックが呼ばれる
    // given (前提条件):
    let server = TestServer::start().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let joined_tx = tx.clone();
    let callbacks = RelayCallbacks::new()
        .on_user_joined(move |user_id, _, participants| {
            let _ = joined_tx.send(format!("joined {} {}", user_id, participants));
        })
        .on_user_left(move |user_id, _, participants| {
            let _ = tx.send(format!("left {} {}", user_id, participants));
        });
    let a = RelayClient::start(
        RelayClientConfig::new(&server.url, "r1", "a", "A"),
        callbacks,
    );
    assert!(wait_for_state(&a, |s| s.is_connected()).await);

    // when (操作):
    let b = RelayClient::start(
        RelayClientConfig::new(&server.url, "r1", "b", "B"),
        RelayCallbacks::new(),
    );
    let joined = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    b.shutdown().await;
    let left = timeout(WAIT, rx.recv()).await.unwrap().unwrap();

    // then (期待する結果):
    assert_eq!(joined, "joined b 2");
    assert_eq!(left, "left b 1");
    assert_eq!(a.participants(), 1);

    a.shutdown().await;
}

#[tokio::test]
async fn test_reconnects_after_server_drop() {
    // テスト項目: サーバー側で切断されると、約 3 秒後に自動で再接続して再 join する
    // given (前提条件):
    let relay = ScriptedRelay::bind().await;
    let client = RelayClient::start(
        RelayClientConfig::new(&relay.url, "room-42", "u1", "Alice"),
        RelayCallbacks::new(),
    );
    let (first, join) = relay.accept_and_join(1).await;
    assert_eq!(
        join,
        json!({"type": "join", "roomId": "room-42", "userId": "u1", "userName": "Alice"})
    );
    assert!(wait_for_state(&client, |s| s.is_connected() && s.participants == 1).await);

    // when (操作):
    drop(first);
    let dropped_at = Instant::now();
    assert!(wait_for_state(&client, |s| !s.is_connected()).await);
    let (_second, rejoin) = relay.accept_and_join(1).await;
    let elapsed = dropped_at.elapsed();

    // then (期待する結果):
    assert_eq!(rejoin, join);
    assert!(wait_for_state(&client, |s| s.is_connected()).await);
    assert!(elapsed >= Duration::from_millis(2500), "reconnected after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(5), "reconnected after {:?}", elapsed);

    client.shutdown().await;
}

#[tokio::test]
async fn test_set_callbacks_does_not_reconnect() {
    // テスト項目: コールバックの差し替えは再接続を起こさず、次のイベントから反映される
    // given (前提条件):
    let relay = ScriptedRelay::bind().await;
    let (old_callbacks, mut old_rx) = message_channel();
    let (new_callbacks, mut new_rx) = message_channel();
    let client = RelayClient::start(
        RelayClientConfig::new(&relay.url, "r1", "u1", "Alice"),
        old_callbacks,
    );
    let (mut ws, _) = relay.accept_and_join(2).await;
    assert!(wait_for_state(&client, |s| s.is_connected()).await);

    // when (操作):
    client.set_callbacks(new_callbacks);
    send_json(
        &mut ws,
        json!({"type": "broadcast", "data": "hi", "userId": "u2", "userName": "Bob"}),
    )
    .await;

    // then (期待する結果):
    let received = timeout(WAIT, new_rx.recv()).await.unwrap().unwrap();
    assert_eq!(received.0, json!("hi"));
    assert!(old_rx.try_recv().is_err());
    assert!(
        timeout(Duration::from_millis(300), relay.accept())
            .await
            .is_err()
    );

    client.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_closes_transport() {
    // テスト項目: shutdown で Close フレームが送られ、その後 broadcast は送られない
    // given (前提条件):
    let relay = ScriptedRelay::bind().await;
    let client = RelayClient::start(
        RelayClientConfig::new(&relay.url, "r1", "u1", "Alice"),
        RelayCallbacks::new(),
    );
    let (mut ws, _) = relay.accept_and_join(1).await;
    assert!(wait_for_state(&client, |s| s.is_connected()).await);

    // when (操作):
    client.shutdown().await;

    // then (期待する結果):
    let message = timeout(WAIT, ws.next()).await.unwrap();
    assert!(matches!(message, Some(Ok(Message::Close(_))) | None));
    assert!(
        timeout(Duration::from_millis(3500), relay.accept())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_drop_tears_down_pending_reconnect() {
    // テスト項目: 再接続待ちの間にハンドルを破棄すると、再接続は行われない
    // given (前提条件):
    let relay = ScriptedRelay::bind().await;
    let client = RelayClient::start(
        RelayClientConfig::new(&relay.url, "r1", "u1", "Alice"),
        RelayCallbacks::new(),
    );
    let (first, _) = relay.accept_and_join(1).await;
    assert!(wait_for_state(&client, |s| s.is_connected()).await);
    drop(first);
    assert!(wait_for_state(&client, |s| !s.is_connected()).await);

    // when (操作):
    drop(client);

    // then (期待する結果):
    assert!(
        timeout(Duration::from_millis(4000), relay.accept())
            .await
            .is_err()
    );
}
