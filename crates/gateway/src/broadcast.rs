//! Periodic quote fan-out to symbol subscribers.
//!
//! A single task wakes on a fixed interval, takes a point-in-time copy of the
//! subscription index, fetches one quote per subscribed symbol, and pushes it
//! to every subscriber. Sends go through each client's bounded channel, never
//! while holding the registry, and a failed send skips that client only.

use crate::client::ClientRegistry;
use axum::extract::ws::Message;
use engine::QuoteSource;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Configuration for the quote broadcaster.
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Time between broadcast ticks.
    pub interval: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Pushes quote snapshots to subscribed clients on a fixed interval.
pub struct QuoteBroadcaster {
    registry: Arc<ClientRegistry>,
    quotes: Arc<dyn QuoteSource>,
    config: BroadcastConfig,
}

impl QuoteBroadcaster {
    pub fn new(
        registry: Arc<ClientRegistry>,
        quotes: Arc<dyn QuoteSource>,
        config: BroadcastConfig,
    ) -> Self {
        Self {
            registry,
            quotes,
            config,
        }
    }

    /// Run the broadcast loop until a shutdown signal arrives (or the
    /// shutdown channel is dropped).
    pub async fn run(self: Arc<Self>, mut shutdown_rx: mpsc::Receiver<()>) {
        info!(
            "Starting quote broadcaster, interval {:?}",
            self.config.interval
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    info!("Quote broadcaster received shutdown signal");
                    break;
                }

                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        info!("Quote broadcaster stopped");
    }

    /// One broadcast pass over a snapshot of the subscription index.
    ///
    /// A quote failure or a dead subscriber affects that symbol/client only;
    /// the pass always continues to the rest of the snapshot.
    pub async fn tick(&self) {
        for (symbol, subscribers) in self.registry.snapshot() {
            let book = match self.quotes.quote(&symbol).await {
                Ok(book) => book,
                Err(e) => {
                    warn!("Quote fetch failed for {}: {}", symbol, e);
                    counter!("hub_broadcast_errors_total", "kind" => "quote").increment(1);
                    continue;
                }
            };

            // Serialize once per symbol, not per subscriber.
            let json = match serde_json::to_string(&book) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to serialize snapshot for {}: {}", symbol, e);
                    continue;
                }
            };

            for client in subscribers {
                if client.try_send_raw(Message::Text(json.clone().into())) {
                    counter!("hub_broadcast_frames_total").increment(1);
                } else {
                    // Slow or just-closed client; its own task cleans it up.
                    debug!("Dropped broadcast frame for client {}", client.id);
                    counter!("hub_broadcast_errors_total", "kind" => "send").increment(1);
                }
            }
        }
    }
}
