//! Request dispatch: decode, route by method, reply on the issuing connection.
//!
//! Handlers are pure request -> response transformations plus one call into an
//! injected capability; the only state they touch is the shared registry.

use crate::client::{ClientRegistry, ClientState};
use crate::error::Result;
use crate::protocol::{Request, Response};
use engine::{OrderEngine, QuoteSource};
use metrics::counter;
use std::sync::Arc;
use tracing::debug;

/// Routes decoded client requests to the subscription index and capabilities.
pub struct RequestDispatcher {
    registry: Arc<ClientRegistry>,
    orders: Arc<dyn OrderEngine>,
    quotes: Arc<dyn QuoteSource>,
}

impl RequestDispatcher {
    pub fn new(
        registry: Arc<ClientRegistry>,
        orders: Arc<dyn OrderEngine>,
        quotes: Arc<dyn QuoteSource>,
    ) -> Self {
        Self {
            registry,
            orders,
            quotes,
        }
    }

    /// Handle one raw inbound message from `client` and reply on the same
    /// connection. Any error is returned to the caller, which converts it
    /// into an error response for this client only; no other connection's
    /// state is touched by a failure here.
    pub async fn dispatch(&self, client: &Arc<ClientState>, raw: &[u8]) -> Result<()> {
        let request = Request::decode(raw)?;
        let response = self.handle(client, request).await?;
        client.send(&response)
    }

    async fn handle(&self, client: &Arc<ClientState>, request: Request) -> Result<Response> {
        match request {
            Request::Subscribe(p) => {
                debug!("Client {} subscribing to {}", client.id, p.symbol);
                self.registry.subscribe(&client.id, &p.symbol)?;
                counter!("hub_subscriptions_total").increment(1);
                Ok(Response::subscribed(p.symbol))
            }
            Request::Unsubscribe(p) => {
                debug!("Client {} unsubscribing from {}", client.id, p.symbol);
                self.registry.unsubscribe(&client.id, &p.symbol)?;
                Ok(Response::unsubscribed(p.symbol))
            }
            Request::Place(order) => {
                counter!("hub_orders_total", "op" => "place").increment(1);
                Ok(Response::Ack(self.orders.place(order).await?))
            }
            Request::Cancel(p) => {
                counter!("hub_orders_total", "op" => "cancel").increment(1);
                Ok(Response::Ack(self.orders.cancel(&p.order_id).await?))
            }
            Request::Modify(p) => {
                counter!("hub_orders_total", "op" => "modify").increment(1);
                Ok(Response::Ack(self.orders.modify(&p.order_id, p.update).await?))
            }
            Request::Orderbook(p) => Ok(Response::Book(self.quotes.quote(&p.symbol).await?)),
            Request::Currpos(p) => {
                Ok(Response::Position(self.orders.position(&p.currency).await?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CLIENT_CHANNEL_BUFFER_SIZE;
    use async_trait::async_trait;
    use axum::extract::ws::Message;
    use engine::{QuoteSnapshot, StaticQuoteSource, StubOrderEngine};
    use tokio::sync::mpsc;

    fn test_dispatcher() -> (Arc<ClientRegistry>, RequestDispatcher) {
        let registry = Arc::new(ClientRegistry::new());
        let dispatcher = RequestDispatcher::new(
            registry.clone(),
            Arc::new(StubOrderEngine::new()),
            Arc::new(StaticQuoteSource::default()),
        );
        (registry, dispatcher)
    }

    fn connect(registry: &ClientRegistry) -> (Arc<ClientState>, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(CLIENT_CHANNEL_BUFFER_SIZE);
        let client = Arc::new(ClientState::new(tx));
        registry.register(client.clone());
        (client, rx)
    }

    async fn next_json(rx: &mut mpsc::Receiver<Message>) -> serde_json::Value {
        match rx.recv().await.expect("expected a frame") {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[tokio::test]
    async fn subscribe_registers_and_acks() {
        let (registry, dispatcher) = test_dispatcher();
        let (client, mut rx) = connect(&registry);

        dispatcher
            .dispatch(
                &client,
                br#"{"method":"subscribe","params":{"symbol":"BTC-PERPETUAL"}}"#,
            )
            .await
            .unwrap();

        assert_eq!(registry.subscribers("BTC-PERPETUAL").len(), 1);
        let ack = next_json(&mut rx).await;
        assert_eq!(ack["status"], "subscribed");
        assert_eq!(ack["symbol"], "BTC-PERPETUAL");
    }

    #[tokio::test]
    async fn place_replies_with_engine_ack() {
        let (registry, dispatcher) = test_dispatcher();
        let (client, mut rx) = connect(&registry);

        dispatcher
            .dispatch(
                &client,
                br#"{"method":"place","params":{"instrument_name":"ETH-PERPETUAL","amount":40,"type":"limit","price":500}}"#,
            )
            .await
            .unwrap();

        assert_eq!(
            next_json(&mut rx).await,
            serde_json::json!({"status": "order placed"})
        );
    }

    #[tokio::test]
    async fn orderbook_returns_the_quote_snapshot() {
        let (registry, dispatcher) = test_dispatcher();
        let (client, mut rx) = connect(&registry);

        dispatcher
            .dispatch(
                &client,
                br#"{"method":"orderbook","params":{"symbol":"BTC-PERPETUAL"}}"#,
            )
            .await
            .unwrap();

        let book: QuoteSnapshot = serde_json::from_value(next_json(&mut rx).await).unwrap();
        assert_eq!(book.symbol, "BTC-PERPETUAL");
        assert_eq!(book.bids[0].price, 5000.0);
        assert_eq!(book.asks[0].price, 5100.0);
    }

    #[tokio::test]
    async fn currpos_returns_positions_for_currency() {
        let (registry, dispatcher) = test_dispatcher();
        let (client, mut rx) = connect(&registry);

        dispatcher
            .dispatch(&client, br#"{"method":"currpos","params":{"currency":"BTC"}}"#)
            .await
            .unwrap();

        let reply = next_json(&mut rx).await;
        assert_eq!(reply["currency"], "BTC");
        assert_eq!(reply["positions"][0]["type"], "future");
        assert_eq!(reply["positions"][0]["amount"], 10.0);
    }

    #[tokio::test]
    async fn cancel_and_modify_ack() {
        let (registry, dispatcher) = test_dispatcher();
        let (client, mut rx) = connect(&registry);

        dispatcher
            .dispatch(
                &client,
                br#"{"method":"cancel","params":{"order_id":"ETH-123456"}}"#,
            )
            .await
            .unwrap();
        assert_eq!(next_json(&mut rx).await["status"], "order cancelled");

        dispatcher
            .dispatch(
                &client,
                br#"{"method":"modify","params":{"order_id":"ETH-123456","price":510}}"#,
            )
            .await
            .unwrap();
        assert_eq!(next_json(&mut rx).await["status"], "order modified");
    }

    #[tokio::test]
    async fn engine_failure_surfaces_as_error_not_panic() {
        struct FailingEngine;

        #[async_trait]
        impl OrderEngine for FailingEngine {
            async fn place(&self, _: engine::OrderRequest) -> engine::Result<engine::OrderAck> {
                Err(engine::Error::Unavailable("book offline".to_string()))
            }
            async fn cancel(&self, id: &str) -> engine::Result<engine::OrderAck> {
                Err(engine::Error::UnknownOrder(id.to_string()))
            }
            async fn modify(
                &self,
                id: &str,
                _: engine::OrderUpdate,
            ) -> engine::Result<engine::OrderAck> {
                Err(engine::Error::UnknownOrder(id.to_string()))
            }
            async fn position(&self, _: &str) -> engine::Result<engine::PositionSnapshot> {
                Err(engine::Error::Unavailable("ledger offline".to_string()))
            }
        }

        let registry = Arc::new(ClientRegistry::new());
        let dispatcher = RequestDispatcher::new(
            registry.clone(),
            Arc::new(FailingEngine),
            Arc::new(StaticQuoteSource::default()),
        );
        let (client, _rx) = connect(&registry);

        let err = dispatcher
            .dispatch(
                &client,
                br#"{"method":"place","params":{"instrument_name":"X","amount":1}}"#,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "engine_error");
        assert!(err.to_string().contains("book offline"));
    }

    #[tokio::test]
    async fn failure_on_one_connection_leaves_others_untouched() {
        let (registry, dispatcher) = test_dispatcher();
        let (bad, mut bad_rx) = connect(&registry);
        let (good, mut good_rx) = connect(&registry);

        // Malformed message on `bad`: dispatch fails, no reply is queued, and
        // nothing changes for `good`.
        let err = dispatcher.dispatch(&bad, b"{{{ not json").await.unwrap_err();
        assert_eq!(err.code(), "decode_error");
        assert!(bad_rx.try_recv().is_err());

        dispatcher
            .dispatch(
                &good,
                br#"{"method":"orderbook","params":{"symbol":"ETH-PERPETUAL"}}"#,
            )
            .await
            .unwrap();
        let book = next_json(&mut good_rx).await;
        assert_eq!(book["symbol"], "ETH-PERPETUAL");
    }
}
