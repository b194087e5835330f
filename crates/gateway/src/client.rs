//! Client state and the connection/subscription registry.
//!
//! The registry holds the only shared mutable state in the hub: the set of
//! live connections and the symbol -> subscribers index. Both live in DashMaps
//! so registration, cascade removal, subscribe, and snapshotting are each
//! atomic with respect to one another without a global lock.
//!
//! The registry never owns a socket. A handle is a `ClientId` plus an
//! `Arc<ClientState>` carrying a bounded outbound channel; the transport task
//! that created the connection is the only owner of its lifetime.

use crate::error::{GatewayError, Result};
use crate::protocol::Response;
use axum::extract::ws::Message;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Unique client identifier.
pub type ClientId = Uuid;

/// Buffer size for each client's outbound channel. Bounded so a slow
/// consumer drops broadcast frames instead of accumulating unbounded memory.
pub const CLIENT_CHANNEL_BUFFER_SIZE: usize = 256;

/// State for a single connected client.
pub struct ClientState {
    /// Unique client identifier.
    pub id: ClientId,
    /// Channel to the task that owns this client's WebSocket.
    pub tx: mpsc::Sender<Message>,
    /// Symbols this client is subscribed to.
    pub symbols: DashSet<String>,
    /// Timestamp when the client connected (ms).
    pub connected_at: i64,
    /// Timestamp of the last ping/pong seen from this client (ms).
    last_ping: AtomicI64,
}

impl ClientState {
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4(),
            tx,
            symbols: DashSet::new(),
            connected_at: now,
            last_ping: AtomicI64::new(now),
        }
    }

    /// Send a response to this client. Non-blocking: fails if the buffer is
    /// full or the connection task is gone.
    pub fn send(&self, msg: &Response) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.tx
            .try_send(Message::Text(json.into()))
            .map_err(|_| GatewayError::ChannelSend)
    }

    /// Try to send a pre-built frame. Returns false if it was dropped.
    pub fn try_send_raw(&self, msg: Message) -> bool {
        self.tx.try_send(msg).is_ok()
    }

    pub fn update_ping(&self) {
        self.last_ping
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub fn last_ping_time(&self) -> i64 {
        self.last_ping.load(Ordering::Relaxed)
    }

    pub fn is_subscribed(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }
}

/// Registry of connected clients and their symbol subscriptions.
///
/// Maintains:
/// - Client ID -> client state
/// - Symbol -> subscriber IDs (reverse index for broadcast)
///
/// Subscriber lookups resolve IDs through the live-client map, so a handle
/// that is mid-removal can no longer be sent to even if its ID still sits in
/// a symbol set.
pub struct ClientRegistry {
    /// Client ID -> client state.
    clients: DashMap<ClientId, Arc<ClientState>>,
    /// Symbol -> subscriber IDs. Entries are created on first subscribe and
    /// kept when they empty out; broadcast skips symbols with no live
    /// subscribers.
    subscriptions: DashMap<String, DashSet<ClientId>>,
}

impl ClientRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
            subscriptions: DashMap::new(),
        }
    }

    /// Register a client. Idempotent for the same handle.
    pub fn register(&self, client: Arc<ClientState>) -> ClientId {
        let id = client.id;
        self.clients.insert(id, client);
        info!("Client {} registered", id);
        id
    }

    /// Unregister a client and cascade-remove it from every symbol set.
    /// Idempotent: unregistering an unknown or already-removed ID is a no-op.
    pub fn unregister(&self, client_id: &ClientId) {
        // Drop from the live map first: once gone, no subscriber lookup can
        // reach this client, even while the symbol sets are still being swept.
        if let Some((_, client)) = self.clients.remove(client_id) {
            for symbol in client.symbols.iter() {
                if let Some(subscribers) = self.subscriptions.get(&*symbol) {
                    subscribers.remove(client_id);
                }
            }
            info!("Client {} unregistered", client_id);
        }
    }

    /// Get a client by ID.
    pub fn get(&self, client_id: &ClientId) -> Option<Arc<ClientState>> {
        self.clients.get(client_id).map(|r| r.clone())
    }

    /// Subscribe a client to a symbol. Idempotent: re-subscribing leaves the
    /// subscriber set unchanged.
    pub fn subscribe(&self, client_id: &ClientId, symbol: &str) -> Result<()> {
        let client = self
            .clients
            .get(client_id)
            .ok_or_else(|| GatewayError::ClientNotFound(client_id.to_string()))?;

        client.symbols.insert(symbol.to_string());
        self.subscriptions
            .entry(symbol.to_string())
            .or_default()
            .insert(*client_id);

        debug!("Client {} subscribed to {}", client_id, symbol);
        Ok(())
    }

    /// Remove one symbol subscription for a client.
    pub fn unsubscribe(&self, client_id: &ClientId, symbol: &str) -> Result<()> {
        let client = self
            .clients
            .get(client_id)
            .ok_or_else(|| GatewayError::ClientNotFound(client_id.to_string()))?;

        client.symbols.remove(symbol);
        if let Some(subscribers) = self.subscriptions.get(symbol) {
            subscribers.remove(client_id);
        }

        debug!("Client {} unsubscribed from {}", client_id, symbol);
        Ok(())
    }

    /// Live subscribers of one symbol.
    pub fn subscribers(&self, symbol: &str) -> Vec<Arc<ClientState>> {
        match self.subscriptions.get(symbol) {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.clients.get(&*id).map(|c| c.clone()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Point-in-time copy of the symbol -> live subscribers mapping.
    ///
    /// The broadcast scheduler iterates this copy so sends never happen while
    /// holding a map shard. Symbols whose subscriber set is empty (or whose
    /// subscribers have all disconnected) are skipped.
    pub fn snapshot(&self) -> Vec<(String, Vec<Arc<ClientState>>)> {
        self.subscriptions
            .iter()
            .filter_map(|entry| {
                let subscribers: Vec<Arc<ClientState>> = entry
                    .value()
                    .iter()
                    .filter_map(|id| self.clients.get(&*id).map(|c| c.clone()))
                    .collect();
                if subscribers.is_empty() {
                    None
                } else {
                    Some((entry.key().clone(), subscribers))
                }
            })
            .collect()
    }

    /// Total number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Number of symbols with at least one subscription entry.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
