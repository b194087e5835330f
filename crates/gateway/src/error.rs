//! Gateway error types.
//!
//! Every failure is local to the message or connection that produced it; the
//! WebSocket layer turns a `GatewayError` into an error response on the
//! offending connection and nothing else.

use thiserror::Error;

/// Gateway error type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed inbound message (invalid JSON or wrong envelope shape).
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Recognized envelope, unrecognized method name.
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// Params did not match the method's expected shape (e.g., a missing
    /// required field). The serde message names the offending field.
    #[error("invalid params for {method}: {source}")]
    InvalidParams {
        method: &'static str,
        source: serde_json::Error,
    },

    /// OrderEngine/QuoteSource failure, surfaced to the requesting client.
    #[error("engine error: {0}")]
    Engine(#[from] engine::Error),

    /// Operation referenced a connection that is no longer registered.
    #[error("client not found: {0}")]
    ClientNotFound(String),

    /// Outbound channel to the client is full or closed.
    #[error("channel send error")]
    ChannelSend,
}

impl GatewayError {
    /// Stable machine-readable code carried in error responses.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Decode(_) => "decode_error",
            GatewayError::UnknownMethod(_) => "unknown_method",
            GatewayError::InvalidParams { .. } => "invalid_params",
            GatewayError::Engine(_) => "engine_error",
            GatewayError::ClientNotFound(_) => "client_not_found",
            GatewayError::ChannelSend => "send_failed",
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
