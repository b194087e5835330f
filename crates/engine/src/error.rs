//! Error types for the engine capabilities.

use thiserror::Error;

/// Result type alias for capability operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Capability errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Order ID not known to the engine.
    #[error("unknown order: {0}")]
    UnknownOrder(String),

    /// Instrument/symbol not known to the quote source.
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Order was rejected by the engine.
    #[error("order rejected: {0}")]
    Rejected(String),

    /// Backend unavailable or failed mid-operation.
    #[error("engine unavailable: {0}")]
    Unavailable(String),
}
