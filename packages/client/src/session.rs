//! One transport lifetime: connect, join, pump frames until close.

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};

use futures_util::{SinkExt, StreamExt};
use kokuban_shared::protocol::{ServerMessage, decode_server_message};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    callbacks::{CallbackCell, RelayCallbacks},
    config::RelayClientConfig,
    domain::{ConnectionStatus, SessionState},
    error::ClientError,
};

type Outbound = Option<mpsc::UnboundedSender<Message>>;

/// How a session that reached the open state ended
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SessionOutcome {
    /// The transport closed or failed after opening
    Closed,
    /// The client was torn down
    Shutdown,
}

/// State shared between the client handle and its supervisor task.
///
/// Every mutation is dropped once `torn_down` is set, so nothing is observed
/// after teardown.
pub(crate) struct Shared {
    state: watch::Sender<SessionState>,
    outbound: Mutex<Outbound>,
    callbacks: CallbackCell,
    torn_down: AtomicBool,
}

impl Shared {
    pub(crate) fn new(callbacks: RelayCallbacks) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            state,
            outbound: Mutex::new(None),
            callbacks: CallbackCell::new(callbacks),
            torn_down: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub(crate) fn callbacks(&self) -> &CallbackCell {
        &self.callbacks
    }

    pub(crate) fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    pub(crate) fn tear_down(&self) {
        let mut outbound = self.lock_outbound();
        self.torn_down.store(true, Ordering::SeqCst);
        outbound.take();
    }

    pub(crate) fn set_status(&self, status: ConnectionStatus) {
        self.update(|state| state.status = status);
    }

    /// Queue a text frame on the open transport.
    ///
    /// Returns `false` when no transport is open.
    pub(crate) fn send_text(&self, text: String) -> bool {
        match self.lock_outbound().as_ref() {
            Some(sender) => sender.send(Message::text(text)).is_ok(),
            None => false,
        }
    }

    /// Publish the outbound sender of a freshly opened transport.
    ///
    /// The torn-down check runs under the outbound lock that `tear_down` also
    /// takes, so the slot stays empty once teardown has started.
    fn open_transport(&self, sender: mpsc::UnboundedSender<Message>) -> bool {
        {
            let mut outbound = self.lock_outbound();
            if self.is_torn_down() {
                return false;
            }
            *outbound = Some(sender);
        }
        self.set_status(ConnectionStatus::Connected);
        true
    }

    fn close_transport(&self) {
        self.lock_outbound().take();
        self.set_status(ConnectionStatus::Disconnected);
    }

    fn update(&self, modify: impl FnOnce(&mut SessionState)) {
        if self.is_torn_down() {
            return;
        }
        self.state.send_modify(modify);
    }

    fn lock_outbound(&self) -> MutexGuard<'_, Outbound> {
        self.outbound.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply one inbound text frame to the session state and callbacks.
    pub(crate) fn dispatch(&self, text: &str) {
        let message = match decode_server_message(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Ignoring inbound frame: {}", e);
                return;
            }
        };

        if self.is_torn_down() {
            return;
        }
        let callbacks = self.callbacks.snapshot();

        match message {
            ServerMessage::Joined {
                room_id,
                participants,
            } => {
                tracing::info!("Joined room '{}' ({} participant(s))", room_id, participants);
                self.update(|state| state.participants = participants);
                if let Some(handler) = callbacks.on_joined {
                    handler(&room_id, participants);
                }
            }
            ServerMessage::Broadcast {
                data,
                user_id,
                user_name,
            } => {
                if let Some(handler) = callbacks.on_message {
                    match data.to_value() {
                        Ok(data) => handler(data, &user_id, &user_name),
                        Err(e) => tracing::warn!("Dropping broadcast from '{}': {}", user_id, e),
                    }
                }
            }
            ServerMessage::UserJoined {
                user_id,
                user_name,
                participants,
            } => {
                self.update(|state| state.participants = participants);
                if let Some(handler) = callbacks.on_user_joined {
                    handler(&user_id, &user_name, participants);
                }
            }
            ServerMessage::UserLeft {
                user_id,
                user_name,
                participants,
            } => {
                self.update(|state| state.participants = participants);
                if let Some(handler) = callbacks.on_user_left {
                    handler(&user_id, &user_name, participants);
                }
            }
        }
    }
}

/// Resolves once shutdown is requested or the handle is gone.
pub(crate) async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Run one transport from connect to close.
///
/// # Errors
///
/// Returns an error if the transport never reached the open state.
pub(crate) async fn run_session(
    config: &RelayClientConfig,
    shared: &Shared,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<SessionOutcome, ClientError> {
    tracing::debug!("Connecting to {}", config.url);

    let ws_stream = tokio::select! {
        result = connect_async(config.url.as_str()) => {
            let (ws_stream, _) = result.map_err(|e| ClientError::ConnectionError(e.to_string()))?;
            ws_stream
        }
        _ = stopped(shutdown) => return Ok(SessionOutcome::Shutdown),
    };

    let (mut write, mut read) = ws_stream.split();

    // The join frame goes out before any application broadcast can be queued
    let join = config.join_message().to_json()?;
    write
        .send(Message::text(join))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    if !shared.open_transport(tx) {
        return Ok(SessionOutcome::Shutdown);
    }
    tracing::info!("Connected to relay at {}", config.url);

    let outcome = loop {
        tokio::select! {
            _ = stopped(shutdown) => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    tracing::debug!("Failed to send close frame: {}", e);
                }
                break SessionOutcome::Shutdown;
            }
            Some(message) = rx.recv() => {
                if let Err(e) = write.send(message).await {
                    tracing::warn!("Failed to send message: {}", e);
                    break SessionOutcome::Closed;
                }
            }
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => shared.dispatch(text.as_str()),
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Relay closed the connection");
                    break SessionOutcome::Closed;
                }
                Some(Ok(_)) => {
                    // Ping/pong is handled by tungstenite, binary frames are not part of the protocol
                }
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break SessionOutcome::Closed;
                }
            },
        }
    };

    shared.close_transport();
    Ok(outcome)
}
