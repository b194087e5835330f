//! Capability traits the hub calls through.
//!
//! The hub never implements order matching or market data itself; it talks to
//! whatever `OrderEngine` and `QuoteSource` it was constructed with. The stub
//! implementations in [`crate::stub`] satisfy these traits with canned data.

use crate::error::Result;
use crate::types::{OrderAck, OrderRequest, OrderUpdate, PositionSnapshot, QuoteSnapshot};
use async_trait::async_trait;

/// Order-lifecycle capability.
///
/// A production implementation fronts a real matching engine and ledger; the
/// hub only requires that each operation resolves to an acknowledgement or a
/// capability error.
#[async_trait]
pub trait OrderEngine: Send + Sync {
    /// Submit a new order.
    async fn place(&self, order: OrderRequest) -> Result<OrderAck>;

    /// Cancel an open order by ID.
    async fn cancel(&self, order_id: &str) -> Result<OrderAck>;

    /// Modify an open order by ID.
    async fn modify(&self, order_id: &str, update: OrderUpdate) -> Result<OrderAck>;

    /// Fetch all open positions for a currency.
    async fn position(&self, currency: &str) -> Result<PositionSnapshot>;
}

/// Market-data capability.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current order book snapshot for a symbol.
    async fn quote(&self, symbol: &str) -> Result<QuoteSnapshot>;
}
