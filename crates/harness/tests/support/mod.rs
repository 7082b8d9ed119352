//! In-process stub of the simulated exchange.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use url::Url;

use common::HarnessConfig;
use harness::{Captured, Console, ExchangeTestHarness, Pacing};

#[derive(Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, &'static str),
}

impl Reply {
    pub fn ok(v: Value) -> Self {
        Reply::Json(StatusCode::OK, v)
    }
}

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

impl Call {
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Clone, Default)]
struct StubState {
    replies: Arc<Mutex<HashMap<String, Vec<Reply>>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    fallback: Option<Reply>,
}

/// Routes are keyed `"METHOD /path"`. Several replies for one route are
/// served in order; the last one repeats.
pub struct Stub {
    pub url: Url,
    state: StubState,
}

impl Stub {
    pub async fn start(routes: Vec<(&str, Reply)>) -> Self {
        Self::start_with_fallback(routes, None).await
    }

    /// Every unmatched route answers with `fallback`.
    pub async fn start_with_fallback(routes: Vec<(&str, Reply)>, fallback: Option<Reply>) -> Self {
        let mut replies: HashMap<String, Vec<Reply>> = HashMap::new();
        for (route, reply) in routes {
            replies.entry(route.to_string()).or_default().push(reply);
        }
        let state = StubState {
            replies: Arc::new(Mutex::new(replies)),
            calls: Arc::default(),
            fallback,
        };

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Stub {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            state,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn routes(&self) -> Vec<String> {
        self.calls().iter().map(Call::route).collect()
    }

    pub fn count(&self, route: &str) -> usize {
        self.routes().iter().filter(|r| *r == route).count()
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new("stub-api-key-0123456789")
            .with_base_url(self.url.as_str())
            .unwrap()
    }

    /// Harness over the REST transport with no pacing delays.
    pub fn harness(&self) -> (ExchangeTestHarness, Captured) {
        harness_for(&self.config())
    }
}

pub fn harness_for(config: &HarnessConfig) -> (ExchangeTestHarness, Captured) {
    let transport = transport::build(config).unwrap();
    let (console, captured) = Console::capture();
    let harness = ExchangeTestHarness::new(transport, console).with_pacing(Pacing::none());
    (harness, captured)
}

async fn handle(State(state): State<StubState>, method: Method, uri: Uri, body: String) -> Response {
    let call = Call {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        body,
    };
    let route = call.route();
    state.calls.lock().unwrap().push(call);

    let reply = {
        let mut replies = state.replies.lock().unwrap();
        match replies.get_mut(&route) {
            Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
            Some(queue) => queue.first().cloned(),
            None => None,
        }
    };

    match reply.or_else(|| state.fallback.clone()) {
        Some(Reply::Json(status, v)) => (status, Json(v)).into_response(),
        Some(Reply::Text(status, text)) => (status, text).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"code": -1, "msg": format!("no stub for {route}")})),
        )
            .into_response(),
    }
}

// ─── Canned payloads ──────────────────────────────────────────────────────────

pub fn exchange_info(n: usize) -> Value {
    let symbols: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "symbol": format!("COIN{i}USDT"),
                "status": "TRADING",
                "baseAsset": format!("COIN{i}"),
                "quoteAsset": "USDT",
            })
        })
        .collect();
    json!({ "symbols": symbols })
}

pub fn account() -> Value {
    json!({
        "accountType": "FUTURES",
        "canTrade": true,
        "balances": [
            {"asset": "USDT", "free": 9350.5, "locked": 650},
            {"asset": "BNB", "free": 0, "locked": 0},
        ],
        "positions": [
            {"symbol": "BTCUSDT", "side": "LONG", "entryPrice": "66500", "size": "0.02", "leverage": 10},
        ],
    })
}

pub fn order_book() -> Value {
    json!({
        "symbol": "BTCUSDT",
        "lastUpdateId": 1,
        "bids": [{"price": "66990.00", "quantity": "1.2000"}, {"price": "66980.00", "quantity": "0.5000"}],
        "asks": [{"price": "67010.00", "quantity": "0.8000"}],
    })
}

pub fn order_ack(id: &str, side: &str, price: &str) -> Value {
    json!({
        "orderId": id,
        "symbol": "BTCUSDT",
        "side": side,
        "type": "LIMIT",
        "status": "NEW",
        "price": price,
        "origQty": "0.01",
        "executedQty": "0",
    })
}

pub fn open_order(id: i64, side: &str, price: &str) -> Value {
    json!({
        "orderId": id,
        "symbol": "BTCUSDT",
        "side": side,
        "price": price,
        "origQty": "0.01",
        "status": "NEW",
    })
}

pub fn trades(n: usize) -> Value {
    let list: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": i,
                "orderId": 100 + i,
                "symbol": "BTCUSDT",
                "side": if i % 2 == 0 { "BUY" } else { "SELL" },
                "price": "66000",
                "qty": "0.01",
                "fee": "0.33",
                "time": "2024-05-01T10:00:00Z",
            })
        })
        .collect();
    Value::Array(list)
}

/// Stub answering every suite endpoint successfully.
pub fn healthy_routes() -> Vec<(&'static str, Reply)> {
    vec![
        ("GET /api/v3/exchangeInfo", Reply::ok(exchange_info(2))),
        ("GET /api/v3/account", Reply::ok(account())),
        ("GET /api/dashboard/orderbook/BTCUSDT", Reply::ok(order_book())),
        ("POST /api/v3/order", Reply::ok(order_ack("1001", "BUY", "65000"))),
        ("POST /api/v3/order", Reply::ok(order_ack("1002", "SELL", "75000"))),
        (
            "GET /api/v3/openOrders",
            Reply::ok(json!([open_order(1001, "BUY", "65000"), open_order(1002, "SELL", "75000")])),
        ),
        ("GET /api/v3/myTrades", Reply::ok(trades(2))),
        ("DELETE /api/v3/order", Reply::ok(json!({"orderId": 1001, "status": "CANCELLED"}))),
    ]
}
