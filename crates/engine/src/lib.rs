//! Capability boundary for the gateway hub.
//!
//! Defines the order-lifecycle ([`OrderEngine`]) and market-data
//! ([`QuoteSource`]) traits the hub calls through, the shared wire types, and
//! stub implementations that return canned data.

pub mod error;
pub mod stub;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use stub::{StaticQuoteSource, StubOrderEngine};
pub use traits::{OrderEngine, QuoteSource};
pub use types::{
    OrderAck, OrderRequest, OrderSide, OrderType, OrderUpdate, Position, PositionSnapshot,
    PriceLevel, QuoteSnapshot,
};
