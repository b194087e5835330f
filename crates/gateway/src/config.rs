//! Environment-driven configuration with reference defaults.

use std::env;
use std::time::Duration;

/// Hub configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// WebSocket listen port (`LISTEN_PORT`).
    pub port: u16,
    /// Prometheus exporter port (`METRICS_PORT`).
    pub metrics_port: u16,
    /// Broadcast tick interval (`BROADCAST_INTERVAL_MS`).
    pub broadcast_interval: Duration,
}

impl HubConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let port: u16 = env::var("LISTEN_PORT")
            .unwrap_or_else(|_| "9002".to_string())
            .parse()
            .expect("LISTEN_PORT must be a number");
        let metrics_port: u16 = env::var("METRICS_PORT")
            .unwrap_or_else(|_| "9102".to_string())
            .parse()
            .expect("METRICS_PORT must be a number");
        let interval_ms: u64 = env::var("BROADCAST_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .expect("BROADCAST_INTERVAL_MS must be a number");

        Self {
            port,
            metrics_port,
            broadcast_interval: Duration::from_millis(interval_ms),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            port: 9002,
            metrics_port: 9102,
            broadcast_interval: Duration::from_secs(1),
        }
    }
}
