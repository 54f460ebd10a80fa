//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use deai_shared::time::Clock;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{
    ConnectClientUseCase, DisconnectClientUseCase, GetStatsUseCase, JoinCategoryUseCase,
    NextPeerUseCase, RelaySignalUseCase,
};

use super::{
    handler::{get_stats, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Pairing signaling server
///
/// This struct holds the use cases the handlers dispatch to and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_client_usecase,
///     join_category_usecase,
///     next_peer_usecase,
///     relay_signal_usecase,
///     disconnect_client_usecase,
///     get_stats_usecase,
///     clock,
/// );
/// server.run("127.0.0.1".to_string(), 3000).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `connect_client_usecase` - UseCase for connection registration
    /// * `join_category_usecase` - UseCase for joining a category
    /// * `next_peer_usecase` - UseCase for skipping to the next peer
    /// * `relay_signal_usecase` - UseCase for room-scoped relay
    /// * `disconnect_client_usecase` - UseCase for connection teardown
    /// * `get_stats_usecase` - UseCase for the stats endpoint
    /// * `clock` - Clock used for HTTP response timestamps
    pub fn new(
        connect_client_usecase: Arc<ConnectClientUseCase>,
        join_category_usecase: Arc<JoinCategoryUseCase>,
        next_peer_usecase: Arc<NextPeerUseCase>,
        relay_signal_usecase: Arc<RelaySignalUseCase>,
        disconnect_client_usecase: Arc<DisconnectClientUseCase>,
        get_stats_usecase: Arc<GetStatsUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                connect_client_usecase,
                join_category_usecase,
                next_peer_usecase,
                relay_signal_usecase,
                disconnect_client_usecase,
                get_stats_usecase,
                clock,
            }),
        }
    }

    /// Build the axum router with every endpoint attached
    pub fn into_router(self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/stats", get(get_stats))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state)
    }

    /// Run the signaling server until Ctrl+C or SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 3000)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            "Signaling server listening on {}",
            listener.local_addr()?
        );

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
