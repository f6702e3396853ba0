//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    domain::MessagePusher,
    usecase::{GetRoomsUseCase, RelayDispatcher},
};

use super::{
    error::ServerError,
    handler::{
        http::{get_rooms, health_check},
        websocket::websocket_handler,
    },
    heartbeat::{DEFAULT_HEARTBEAT_INTERVAL, clamp_interval, spawn_heartbeat},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket room relay server
///
/// This struct wires the relay dispatcher and the HTTP surface into an axum
/// router and owns the heartbeat task while serving.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(dispatcher, get_rooms_usecase, message_pusher);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// RelayDispatcher（リレーイベントの処理）
    dispatcher: Arc<RelayDispatcher>,
    /// GetRoomsUseCase（Room 一覧取得のユースケース）
    get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// MessagePusher（ハートビートの送信先）
    message_pusher: Arc<dyn MessagePusher>,
    /// ハートビート間隔
    heartbeat_interval: Duration,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `dispatcher` - Dispatcher for relay events
    /// * `get_rooms_usecase` - UseCase for the room listing
    /// * `message_pusher` - Pusher pinged by the heartbeat
    pub fn new(
        dispatcher: Arc<RelayDispatcher>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            dispatcher,
            get_rooms_usecase,
            message_pusher,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    /// Set the heartbeat period. Periods below the minimum are raised to it.
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = clamp_interval(interval);
        self
    }

    /// Build the router with every relay and HTTP endpoint.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            dispatcher: self.dispatcher.clone(),
            get_rooms_usecase: self.get_rooms_usecase.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), ServerError> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await
    }

    /// Serve an already bound listener until Ctrl+C or SIGTERM.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve an already bound listener until `signal` completes.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        tracing::info!("Relay server listening on {}", listener.local_addr()?);

        let heartbeat = spawn_heartbeat(self.message_pusher.clone(), self.heartbeat_interval);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await;

        heartbeat.abort();
        result?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
