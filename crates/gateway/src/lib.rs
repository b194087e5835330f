//! Real-time gateway hub for market data and order requests.
//!
//! This service:
//! - Accepts WebSocket connections from trading clients
//! - Manages per-symbol subscriptions
//! - Answers order-lifecycle requests (place/cancel/modify/position query)
//!   through an injected [`engine::OrderEngine`]
//! - Broadcasts quote snapshots to symbol subscribers on a fixed interval
//!
//! ## Architecture
//!
//! ```text
//! WebSocket clients
//!         ↕ /ws
//! ws_server (per-connection task, open/close/message lifecycle)
//!         ↓ inbound frames           ↑ replies
//! RequestDispatcher ── OrderEngine / QuoteSource capabilities
//!         ↕
//! ClientRegistry (DashMap: clients + symbol → subscribers)
//!         ↑ snapshot per tick
//! QuoteBroadcaster (periodic task, QuoteSource fan-out)
//! ```
//!
//! The registry is the only shared mutable state. Broadcast works from
//! point-in-time snapshots so network sends never overlap with registry
//! mutation, and every outbound path goes through a bounded per-client
//! channel.

pub mod broadcast;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod ws_server;

pub use broadcast::{BroadcastConfig, QuoteBroadcaster};
pub use client::{ClientId, ClientRegistry, ClientState};
pub use config::HubConfig;
pub use dispatcher::RequestDispatcher;
pub use error::{GatewayError, Result};
pub use protocol::{Request, RequestEnvelope, Response};
pub use ws_server::{create_router, AppState};
