//! Gateway hub entry point.
//!
//! Wires the registry, dispatcher, and broadcaster together and serves
//! WebSocket clients until SIGINT/SIGTERM.

use anyhow::Result;
use engine::{StaticQuoteSource, StubOrderEngine};
use gateway::{
    create_router, AppState, BroadcastConfig, ClientRegistry, HubConfig, QuoteBroadcaster,
    RequestDispatcher,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting gateway hub");

    let config = HubConfig::from_env();
    info!("Configuration:");
    info!("  LISTEN_PORT: {}", config.port);
    info!("  METRICS_PORT: {}", config.metrics_port);
    info!("  BROADCAST_INTERVAL: {:?}", config.broadcast_interval);

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()
        .expect("Failed to start Prometheus exporter");
    info!(
        "Prometheus metrics server started on port {}",
        config.metrics_port
    );

    // Stub capabilities; a production deployment injects real ones here.
    let orders = Arc::new(StubOrderEngine::new());
    let quotes = Arc::new(StaticQuoteSource::default());

    let registry = Arc::new(ClientRegistry::new());
    let dispatcher = Arc::new(RequestDispatcher::new(
        registry.clone(),
        orders,
        quotes.clone(),
    ));

    let broadcaster = Arc::new(QuoteBroadcaster::new(
        registry.clone(),
        quotes,
        BroadcastConfig {
            interval: config.broadcast_interval,
        },
    ));

    let (broadcast_shutdown_tx, broadcast_shutdown_rx) = mpsc::channel(1);
    let broadcast_handle = tokio::spawn(broadcaster.run(broadcast_shutdown_rx));

    let state = Arc::new(AppState {
        registry,
        dispatcher,
    });
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Gateway hub listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the broadcaster before the registry goes away with the process.
    info!("Shutting down broadcaster...");
    let _ = broadcast_shutdown_tx.send(()).await;
    let _ = broadcast_handle.await;

    info!("Gateway hub stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received terminate signal"),
    }
}
