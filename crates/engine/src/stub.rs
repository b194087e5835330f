//! Stub capability implementations returning canned data.
//!
//! These stand in for a real matching engine and market-data feed so the hub
//! can run end to end. Every acknowledgement and quote is constant regardless
//! of input, matching the reference behavior.

use crate::error::Result;
use crate::traits::{OrderEngine, QuoteSource};
use crate::types::{
    OrderAck, OrderRequest, OrderUpdate, Position, PositionSnapshot, PriceLevel, QuoteSnapshot,
};
use async_trait::async_trait;

/// Order engine that acknowledges every operation without keeping a book.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubOrderEngine;

impl StubOrderEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OrderEngine for StubOrderEngine {
    async fn place(&self, _order: OrderRequest) -> Result<OrderAck> {
        Ok(OrderAck::new("order placed"))
    }

    async fn cancel(&self, _order_id: &str) -> Result<OrderAck> {
        Ok(OrderAck::new("order cancelled"))
    }

    async fn modify(&self, _order_id: &str, _update: OrderUpdate) -> Result<OrderAck> {
        Ok(OrderAck::new("order modified"))
    }

    async fn position(&self, currency: &str) -> Result<PositionSnapshot> {
        Ok(PositionSnapshot {
            currency: currency.to_string(),
            positions: vec![Position {
                kind: "future".to_string(),
                amount: 10.0,
            }],
        })
    }
}

/// Quote source returning a fixed one-level book for every symbol.
#[derive(Debug, Clone)]
pub struct StaticQuoteSource {
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

impl StaticQuoteSource {
    /// Quote source with custom fixed levels.
    pub fn with_levels(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self { bids, asks }
    }
}

impl Default for StaticQuoteSource {
    fn default() -> Self {
        Self {
            bids: vec![PriceLevel {
                price: 5000.0,
                amount: 1.0,
            }],
            asks: vec![PriceLevel {
                price: 5100.0,
                amount: 1.0,
            }],
        }
    }
}

#[async_trait]
impl QuoteSource for StaticQuoteSource {
    async fn quote(&self, symbol: &str) -> Result<QuoteSnapshot> {
        Ok(QuoteSnapshot {
            symbol: symbol.to_string(),
            bids: self.bids.clone(),
            asks: self.asks.clone(),
        })
    }
}
