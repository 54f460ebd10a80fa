//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ClientRequest, ConnectionId, ConnectionIdFactory},
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    let connection_id = ConnectionIdFactory::generate().map_err(|e| {
        tracing::error!("Failed to issue connection id: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id)))
}

/// Spawns a task that forwards frames from the rx channel to the WebSocket sender.
///
/// Everything addressed to this connection (its own notifications and relayed
/// peer messages) goes through the channel registered with the MessagePusher.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    if let Err(e) = state
        .connect_client_usecase
        .execute(connection_id.clone(), tx)
        .await
    {
        tracing::warn!("Rejecting connection '{}': {}", connection_id, e);
        return;
    }
    tracing::info!("Connection '{}' opened", connection_id);

    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&state_clone, &connection_id_clone, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let notified = state
        .disconnect_client_usecase
        .execute(&connection_id)
        .await;
    tracing::info!(
        "Connection '{}' closed ({} peer notified)",
        connection_id,
        notified
    );
}

/// Parse one inbound frame and dispatch it to its use case.
///
/// Malformed frames and protocol misuse are logged and dropped; the client
/// never receives an error frame.
async fn handle_text(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Ignoring malformed frame from '{}': {}", connection_id, e);
            return;
        }
    };
    let request = match ClientRequest::try_from(message) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Ignoring invalid frame from '{}': {}", connection_id, e);
            return;
        }
    };

    let result = match request {
        ClientRequest::JoinCategory { category } => state
            .join_category_usecase
            .execute(connection_id, category)
            .await
            .map(|paired| {
                tracing::info!(
                    "'{}' joined ({})",
                    connection_id,
                    if paired { "paired" } else { "waiting" }
                );
            }),
        ClientRequest::Next { category } => state
            .next_peer_usecase
            .execute(connection_id, category)
            .await
            .map(|_| tracing::info!("'{}' requested next", connection_id)),
        ClientRequest::Relay {
            room,
            kind,
            payload,
        } => state
            .relay_signal_usecase
            .execute(connection_id, &room, kind, payload)
            .await
            .map(|delivered| {
                tracing::debug!(
                    "Relayed {} from '{}' in '{}' (delivered: {})",
                    kind.as_str(),
                    connection_id,
                    room,
                    delivered
                );
            }),
    };

    if let Err(e) = result {
        tracing::warn!("Ignoring request from '{}': {}", connection_id, e);
    }
}
