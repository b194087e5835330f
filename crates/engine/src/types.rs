//! Common order and market-data types shared by the hub and its capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Limit order at a given price (default).
    #[default]
    Limit,
    /// Market order - immediate execution at best price.
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "limit"),
            OrderType::Market => write!(f, "market"),
        }
    }
}

/// Order placement request.
///
/// # Examples
///
/// Limit buy:
/// ```json
/// { "instrument_name": "ETH-PERPETUAL", "amount": 40, "type": "limit", "price": 500 }
/// ```
///
/// Market order (no price):
/// ```json
/// { "instrument_name": "ETH-PERPETUAL", "amount": 40, "type": "market" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Instrument identifier (e.g., "ETH-PERPETUAL").
    pub instrument_name: String,
    /// Order size in contracts.
    pub amount: f64,
    /// Order type - defaults to limit when not specified.
    #[serde(rename = "type", default)]
    pub order_type: OrderType,
    /// Limit price. Required for limit orders.
    #[serde(default)]
    pub price: Option<f64>,
    /// Order side (buy or sell).
    #[serde(default)]
    pub side: Option<OrderSide>,
    /// Client-supplied order label.
    #[serde(default)]
    pub label: Option<String>,
}

/// Fields that can change on an open order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Acknowledgement returned by the order engine for lifecycle operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderAck {
    /// Human-readable status (e.g., "order placed").
    pub status: String,
    /// Engine-assigned order ID, when the operation touched one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl OrderAck {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            order_id: None,
        }
    }

    pub fn with_order_id(status: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            order_id: Some(order_id.into()),
        }
    }
}

/// A single open position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    /// Position kind (e.g., "future", "option").
    #[serde(rename = "type")]
    pub kind: String,
    /// Signed position size.
    pub amount: f64,
}

/// All open positions for one currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionSnapshot {
    pub currency: String,
    pub positions: Vec<Position>,
}

/// One price level of an order book side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceLevel {
    pub price: f64,
    pub amount: f64,
}

/// Point-in-time order book snapshot for one symbol.
///
/// This is both the reply to an `orderbook` request and the shape pushed to
/// subscribers on every broadcast tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteSnapshot {
    pub symbol: String,
    /// Bid levels, best first.
    pub bids: Vec<PriceLevel>,
    /// Ask levels, best first.
    pub asks: Vec<PriceLevel>,
}
