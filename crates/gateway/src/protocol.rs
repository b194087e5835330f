//! JSON wire format for client requests and server responses.
//!
//! Inbound messages carry a `{"method": ..., "params": {...}}` envelope.
//! Decoding is two-stage: the envelope first, then the method-specific params,
//! so an unrecognized method and a malformed params object produce distinct
//! errors.

use crate::error::{GatewayError, Result};
use engine::{OrderAck, OrderRequest, OrderUpdate, PositionSnapshot, QuoteSnapshot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ============================================================================
// Client → Server
// ============================================================================

/// Raw request envelope, before the method is resolved.
#[derive(Debug, Deserialize)]
pub struct RequestEnvelope {
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Params carrying a single symbol (`subscribe`, `unsubscribe`, `orderbook`).
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolParams {
    pub symbol: String,
}

/// Params for `cancel`.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelParams {
    pub order_id: String,
}

/// Params for `modify`: the order ID plus the fields to change.
#[derive(Debug, Clone, Deserialize)]
pub struct ModifyParams {
    pub order_id: String,
    #[serde(flatten)]
    pub update: OrderUpdate,
}

/// Params for `currpos`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyParams {
    pub currency: String,
}

/// Fully decoded request, one variant per recognized method.
#[derive(Debug)]
pub enum Request {
    Subscribe(SymbolParams),
    Unsubscribe(SymbolParams),
    Place(OrderRequest),
    Cancel(CancelParams),
    Modify(ModifyParams),
    Orderbook(SymbolParams),
    Currpos(CurrencyParams),
}

impl Request {
    /// Decode one inbound message.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let envelope: RequestEnvelope = serde_json::from_slice(raw)?;
        Self::from_envelope(envelope)
    }

    /// Resolve the method name and decode its params.
    pub fn from_envelope(envelope: RequestEnvelope) -> Result<Self> {
        fn params<T: DeserializeOwned>(
            method: &'static str,
            value: serde_json::Value,
        ) -> Result<T> {
            serde_json::from_value(value)
                .map_err(|source| GatewayError::InvalidParams { method, source })
        }

        match envelope.method.as_str() {
            "subscribe" => Ok(Request::Subscribe(params("subscribe", envelope.params)?)),
            "unsubscribe" => Ok(Request::Unsubscribe(params("unsubscribe", envelope.params)?)),
            "place" => Ok(Request::Place(params("place", envelope.params)?)),
            "cancel" => Ok(Request::Cancel(params("cancel", envelope.params)?)),
            "modify" => Ok(Request::Modify(params("modify", envelope.params)?)),
            "orderbook" => Ok(Request::Orderbook(params("orderbook", envelope.params)?)),
            "currpos" => Ok(Request::Currpos(params("currpos", envelope.params)?)),
            other => Err(GatewayError::UnknownMethod(other.to_string())),
        }
    }
}

// ============================================================================
// Server → Client
// ============================================================================

/// Body of an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Message sent from server to client.
///
/// Serialized untagged: each variant is already a self-describing JSON shape
/// (`{"status": ...}`, a full book, `{"error": {...}}`).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Order-lifecycle acknowledgement, forwarded from the engine.
    Ack(OrderAck),
    /// Order book reply to an `orderbook` request.
    Book(QuoteSnapshot),
    /// Position reply to a `currpos` request.
    Position(PositionSnapshot),
    /// Subscribe/unsubscribe acknowledgement.
    SubscriptionAck { status: &'static str, symbol: String },
    /// Error response, sent only on the connection that caused it.
    Error { error: ErrorBody },
}

impl Response {
    pub fn subscribed(symbol: String) -> Self {
        Response::SubscriptionAck {
            status: "subscribed",
            symbol,
        }
    }

    pub fn unsubscribed(symbol: String) -> Self {
        Response::SubscriptionAck {
            status: "unsubscribed",
            symbol,
        }
    }

    pub fn error(err: &GatewayError) -> Self {
        Response::Error {
            error: ErrorBody {
                code: err.code(),
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_subscribe() {
        let raw = br#"{"method":"subscribe","params":{"symbol":"BTC-PERPETUAL"}}"#;
        match Request::decode(raw).unwrap() {
            Request::Subscribe(p) => assert_eq!(p.symbol, "BTC-PERPETUAL"),
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn decodes_place_with_reference_fields() {
        let raw = br#"{"method":"place","params":{"instrument_name":"ETH-PERPETUAL","amount":40,"type":"limit","price":500}}"#;
        match Request::decode(raw).unwrap() {
            Request::Place(order) => {
                assert_eq!(order.instrument_name, "ETH-PERPETUAL");
                assert_eq!(order.amount, 40.0);
                assert_eq!(order.price, Some(500.0));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn decodes_modify_with_flattened_update() {
        let raw = br#"{"method":"modify","params":{"order_id":"ETH-123456","price":510}}"#;
        match Request::decode(raw).unwrap() {
            Request::Modify(p) => {
                assert_eq!(p.order_id, "ETH-123456");
                assert_eq!(p.update.price, Some(510.0));
                assert_eq!(p.update.amount, None);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn unknown_method_is_an_explicit_error() {
        let err = Request::decode(br#"{"method":"bogus","params":{}}"#).unwrap_err();
        assert!(matches!(err, GatewayError::UnknownMethod(ref m) if m == "bogus"));
        assert_eq!(err.code(), "unknown_method");
    }

    #[test]
    fn missing_param_names_the_field() {
        let err = Request::decode(br#"{"method":"subscribe","params":{}}"#).unwrap_err();
        assert_eq!(err.code(), "invalid_params");
        assert!(err.to_string().contains("symbol"));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = Request::decode(b"not json at all").unwrap_err();
        assert_eq!(err.code(), "decode_error");
    }

    #[test]
    fn missing_params_object_defaults_to_null() {
        // {"method":"currpos"} with no params at all still reaches the
        // params stage and fails there, not at the envelope.
        let err = Request::decode(br#"{"method":"currpos"}"#).unwrap_err();
        assert_eq!(err.code(), "invalid_params");
    }

    #[test]
    fn ack_response_serializes_to_bare_status() {
        let json =
            serde_json::to_value(Response::Ack(OrderAck::new("order placed"))).unwrap();
        assert_eq!(json, serde_json::json!({"status": "order placed"}));
    }

    #[test]
    fn error_response_carries_code_and_message() {
        let err = GatewayError::UnknownMethod("bogus".to_string());
        let json = serde_json::to_value(Response::error(&err)).unwrap();
        assert_eq!(json["error"]["code"], "unknown_method");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("bogus"));
    }
}
