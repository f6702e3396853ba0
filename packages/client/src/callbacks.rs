//! Application callbacks and the latest-callback holder.

use std::sync::{Arc, RwLock};

use serde_json::Value;

/// Called with `(data, user_id, user_name)` for every relayed broadcast
pub type MessageHandler = Arc<dyn Fn(Value, &str, &str) + Send + Sync>;

/// Called with `(room_id, participants)` when the relay acknowledges a join
pub type JoinedHandler = Arc<dyn Fn(&str, usize) + Send + Sync>;

/// Called with `(user_id, user_name, participants)` on presence changes
pub type PresenceHandler = Arc<dyn Fn(&str, &str, usize) + Send + Sync>;

/// Handlers invoked by the client for inbound relay events.
#[derive(Clone, Default)]
pub struct RelayCallbacks {
    pub on_message: Option<MessageHandler>,
    pub on_joined: Option<JoinedHandler>,
    pub on_user_joined: Option<PresenceHandler>,
    pub on_user_left: Option<PresenceHandler>,
}

impl RelayCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_message(
        mut self,
        handler: impl Fn(Value, &str, &str) + Send + Sync + 'static,
    ) -> Self {
        self.on_message = Some(Arc::new(handler));
        self
    }

    pub fn on_joined(mut self, handler: impl Fn(&str, usize) + Send + Sync + 'static) -> Self {
        self.on_joined = Some(Arc::new(handler));
        self
    }

    pub fn on_user_joined(
        mut self,
        handler: impl Fn(&str, &str, usize) + Send + Sync + 'static,
    ) -> Self {
        self.on_user_joined = Some(Arc::new(handler));
        self
    }

    pub fn on_user_left(
        mut self,
        handler: impl Fn(&str, &str, usize) + Send + Sync + 'static,
    ) -> Self {
        self.on_user_left = Some(Arc::new(handler));
        self
    }
}

impl std::fmt::Debug for RelayCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayCallbacks")
            .field("on_message", &self.on_message.is_some())
            .field("on_joined", &self.on_joined.is_some())
            .field("on_user_joined", &self.on_user_joined.is_some())
            .field("on_user_left", &self.on_user_left.is_some())
            .finish()
    }
}

/// Holds the most recently installed callbacks.
///
/// The session reads through this cell on every event, so replacing the
/// callbacks takes effect immediately and never touches the transport.
#[derive(Clone, Default)]
pub struct CallbackCell {
    inner: Arc<RwLock<RelayCallbacks>>,
}

impl CallbackCell {
    pub fn new(callbacks: RelayCallbacks) -> Self {
        Self {
            inner: Arc::new(RwLock::new(callbacks)),
        }
    }

    pub fn replace(&self, callbacks: RelayCallbacks) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = callbacks;
    }

    /// Clone the current handlers so they run without holding the lock.
    pub fn snapshot(&self) -> RelayCallbacks {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
