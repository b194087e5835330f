//! WebSocket server handler using Axum.
//!
//! Owns the connection lifecycle: upgrade, registration, the per-connection
//! read loop, and cleanup. The registry only ever sees opaque handles; the
//! socket itself lives and dies with the task spawned here.

use crate::client::{ClientRegistry, ClientState, CLIENT_CHANNEL_BUFFER_SIZE};
use crate::dispatcher::RequestDispatcher;
use crate::error::Result;
use crate::protocol::Response;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Interval between server-initiated keepalive pings.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Shared application state.
pub struct AppState {
    pub registry: Arc<ClientRegistry>,
    pub dispatcher: Arc<RequestDispatcher>,
}

/// Create the WebSocket router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Health check handler.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let clients = state.registry.client_count();
    let subscriptions = state.registry.subscription_count();
    format!(
        r#"{{"status":"ok","clients":{},"subscriptions":{}}}"#,
        clients, subscriptions
    )
}

/// WebSocket upgrade handler.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection from registration to cleanup.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Bounded channel: a slow consumer drops frames instead of buffering
    // without limit.
    let (tx, mut rx) = mpsc::channel::<Message>(CLIENT_CHANNEL_BUFFER_SIZE);

    let client = Arc::new(ClientState::new(tx));
    let client_id = state.registry.register(client.clone());

    counter!("hub_connections_total").increment(1);
    gauge!("hub_active_connections").set(state.registry.client_count() as f64);

    info!("Client {} connected", client_id);

    // Forward queued outbound messages to the socket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut ping_interval = interval(PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(msg)) => {
                        if let Err(e) = handle_message(&state, &client, msg).await {
                            // Failure is per-message: report it to this client
                            // and keep the connection open.
                            warn!("Error handling message from {}: {}", client_id, e);
                            let _ = client.send(&Response::error(&e));
                        }
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {:?}", client_id, e);
                        break;
                    }
                    None => {
                        // Connection closed.
                        break;
                    }
                }
            }

            _ = ping_interval.tick() => {
                if client.tx.try_send(Message::Ping(vec![].into())).is_err() {
                    break;
                }
            }
        }
    }

    // Close is the last event the registry sees for this handle.
    state.registry.unregister(&client_id);
    send_task.abort();

    counter!("hub_disconnections_total").increment(1);
    gauge!("hub_active_connections").set(state.registry.client_count() as f64);

    info!("Client {} disconnected", client_id);
}

/// Handle a single WebSocket frame.
async fn handle_message(
    state: &Arc<AppState>,
    client: &Arc<ClientState>,
    msg: Message,
) -> Result<()> {
    match msg {
        Message::Text(text) => state.dispatcher.dispatch(client, text.as_bytes()).await,
        Message::Binary(data) => state.dispatcher.dispatch(client, &data).await,
        Message::Ping(data) => {
            client.update_ping();
            // axum answers pings itself, but a pong here is harmless and
            // keeps the behavior explicit.
            let _ = client.try_send_raw(Message::Pong(data));
            Ok(())
        }
        Message::Pong(_) => {
            client.update_ping();
            Ok(())
        }
        Message::Close(_) => {
            // The read loop terminates when the stream ends.
            Ok(())
        }
    }
}
