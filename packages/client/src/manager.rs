//! Client connection manager with reconnection support.

use std::{sync::Arc, time::Duration};

use kokuban_shared::protocol::{ClientMessage, Payload};
use serde_json::Value;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    callbacks::RelayCallbacks,
    config::RelayClientConfig,
    domain::{ConnectionStatus, SessionState},
    session::{SessionOutcome, Shared, run_session, stopped},
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle to one relay membership.
///
/// Starting a client spawns a supervisor task that connects, joins the
/// configured room and reconnects after every close until the handle is shut
/// down or dropped.
///
/// # Example
///
/// ```ignore
/// let config = RelayClientConfig::new("ws://127.0.0.1:8080/ws", "room-42", "u1", "Alice");
/// let callbacks = RelayCallbacks::new().on_message(|data, _user_id, user_name| {
///     println!("{}: {}", user_name, data);
/// });
/// let client = RelayClient::start(config, callbacks);
/// client.broadcast(serde_json::json!({"x": 1}));
/// client.shutdown().await;
/// ```
pub struct RelayClient {
    shared: Arc<Shared>,
    shutdown: watch::Sender<bool>,
    supervisor: Option<JoinHandle<()>>,
}

impl RelayClient {
    /// Start the client on the current tokio runtime.
    pub fn start(config: RelayClientConfig, callbacks: RelayCallbacks) -> Self {
        let shared = Arc::new(Shared::new(callbacks));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let supervisor = tokio::spawn(supervise(config, shared.clone(), shutdown_rx));

        Self {
            shared,
            shutdown,
            supervisor: Some(supervisor),
        }
    }

    /// Send a payload to the other members of the room.
    ///
    /// Returns `false` without queueing anything when the transport is not
    /// open.
    pub fn broadcast(&self, data: Value) -> bool {
        if !self.is_connected() {
            return false;
        }
        let encoded = Payload::from_value(&data)
            .and_then(|data| (ClientMessage::Broadcast { data }).to_json());
        match encoded {
            Ok(json) => self.shared.send_text(json),
            Err(e) => {
                tracing::warn!("Failed to encode broadcast: {}", e);
                false
            }
        }
    }

    /// Replace the callbacks without touching the connection.
    pub fn set_callbacks(&self, callbacks: RelayCallbacks) {
        self.shared.callbacks().replace(callbacks);
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state().status
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    pub fn participants(&self) -> usize {
        self.state().participants
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.subscribe()
    }

    /// Tear down and wait for the supervisor to close the transport.
    ///
    /// The supervisor is aborted if it does not finish in time.
    pub async fn shutdown(mut self) {
        self.tear_down();

        if let Some(mut supervisor) = self.supervisor.take()
            && tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut supervisor)
                .await
                .is_err()
        {
            tracing::warn!("Relay client did not stop in time, aborting");
            supervisor.abort();
        }
    }

    fn tear_down(&self) {
        self.shared.tear_down();
        self.shutdown.send_replace(true);
    }
}

impl Drop for RelayClient {
    fn drop(&mut self) {
        self.tear_down();
    }
}

/// Keep one transport alive until shutdown.
async fn supervise(
    config: RelayClientConfig,
    shared: Arc<Shared>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut consecutive_failures: u32 = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }
        shared.set_status(ConnectionStatus::Connecting);

        match run_session(&config, &shared, &mut shutdown).await {
            Ok(SessionOutcome::Shutdown) => break,
            Ok(SessionOutcome::Closed) => {
                consecutive_failures = 0;
                tracing::warn!("Connection to {} lost", config.url);
            }
            Err(e) => {
                consecutive_failures = consecutive_failures.saturating_add(1);
                tracing::warn!("Connection attempt failed: {}", e);
            }
        }
        shared.set_status(ConnectionStatus::Disconnected);

        let delay = config.reconnect_policy.delay(consecutive_failures);
        tracing::info!("Reconnecting in {:?}...", delay);

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stopped(&mut shutdown) => break,
        }
    }

    tracing::debug!("Relay client stopped");
}
