use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::{Map, Value};

use common::{ApiRequest, ExchangeTransport, Result};
use harness::{Captured, Console, ExchangeTestHarness, Pacing};

/// Answers every request with the same body, classified the way the real
/// transports classify a 200 response.
struct FixedTransport(String);

#[async_trait]
impl ExchangeTransport for FixedTransport {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn send(&self, _request: ApiRequest) -> Result<Value> {
        transport::response::classify(200, &self.0)
    }
}

fn non_list_json() -> impl Strategy<Value = Value> {
    let scalar = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
    ]
    .boxed();
    let object = proptest::collection::btree_map("[a-zA-Z]{1,8}", scalar.clone(), 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()));
    prop_oneof![scalar, object]
}

fn harness(body: &Value) -> (ExchangeTestHarness, Captured) {
    let (console, captured) = Console::capture();
    let h = ExchangeTestHarness::new(Arc::new(FixedTransport(body.to_string())), console)
        .with_pacing(Pacing::none());
    (h, captured)
}

proptest! {
    /// Open orders and trades degrade to an empty list for any response
    /// that is not a JSON list, whatever the symbol.
    #[test]
    fn list_queries_never_fail_on_non_list_bodies(
        body in non_list_json(),
        symbol in "[A-Z]{0,10}",
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (h, _out) = harness(&body);
            assert!(h.fetch_open_orders(&symbol).await.is_empty());
            assert!(h.fetch_trades(&symbol).await.is_empty());
        });
    }

    /// Any negative `code` makes create-order return no id and print the
    /// server's `msg` as the failure text.
    #[test]
    fn negative_code_never_yields_an_order_id(
        code in i64::MIN..0,
        msg in "[a-zA-Z ]{0,24}",
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let body = serde_json::json!({"code": code, "msg": msg, "orderId": "1"});
            let (h, out) = harness(&body);
            let id = h
                .create_order("BTCUSDT", common::OrderSide::Buy, 65000.0, 0.01, 10)
                .await;
            assert!(id.is_none());
            assert!(out.text().contains(&format!("[-] failed: {msg}\n")));
        });
    }
}
