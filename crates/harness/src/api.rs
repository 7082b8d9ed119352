use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use common::{
    AccountInfo, ApiRequest, CancelResult, Error, ExchangeInfo, ExchangeTransport,
    LeaderboardEntry, OpenOrder, OrderBook, OrderRequest, OrderResult, Result, Trade,
};

pub const EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";
pub const ACCOUNT_PATH: &str = "/api/v3/account";
pub const ORDER_PATH: &str = "/api/v3/order";
pub const OPEN_ORDERS_PATH: &str = "/api/v3/openOrders";
pub const MY_TRADES_PATH: &str = "/api/v3/myTrades";
pub const ORDER_BOOK_PATH: &str = "/api/dashboard/orderbook";
pub const LEADERBOARD_PATH: &str = "/api/dashboard/leaderboard";

/// Typed view of the exchange endpoints. Each call is one request; the
/// JSON payload is decoded into the expected shape or rejected with
/// `Error::Shape`.
pub struct ExchangeApi {
    transport: Arc<dyn ExchangeTransport>,
}

impl ExchangeApi {
    pub fn new(transport: Arc<dyn ExchangeTransport>) -> Self {
        Self { transport }
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub async fn exchange_info(&self) -> Result<ExchangeInfo> {
        let value = self.transport.send(ApiRequest::get(EXCHANGE_INFO_PATH)).await?;
        decode_object(value, "exchange info")
    }

    pub async fn account(&self) -> Result<AccountInfo> {
        let value = self.transport.send(ApiRequest::get(ACCOUNT_PATH)).await?;
        decode_object(value, "account")
    }

    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderResult> {
        debug!(symbol = %order.symbol, side = %order.side, client_order_id = %order.client_order_id, "Creating order");
        let value = self
            .transport
            .send(ApiRequest::post(ORDER_PATH, order.to_body()))
            .await?;
        decode_object(value, "order")
    }

    pub async fn open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>> {
        let value = self
            .transport
            .send(ApiRequest::get(OPEN_ORDERS_PATH).param("symbol", symbol))
            .await?;
        decode_list(value, "open orders")
    }

    /// An empty success body is accepted; the exchange is not required to
    /// echo anything back on cancel.
    pub async fn cancel_order(&self, order_id: &str, symbol: &str) -> Result<CancelResult> {
        let value = self
            .transport
            .send(
                ApiRequest::delete(ORDER_PATH)
                    .param("orderId", order_id)
                    .param("symbol", symbol),
            )
            .await?;
        match value {
            Value::Null => Ok(CancelResult::default()),
            other => decode_object(other, "cancel result"),
        }
    }

    pub async fn my_trades(&self, symbol: &str) -> Result<Vec<Trade>> {
        let value = self
            .transport
            .send(ApiRequest::get(MY_TRADES_PATH).param("symbol", symbol))
            .await?;
        decode_list(value, "trades")
    }

    pub async fn order_book(&self, symbol: &str) -> Result<OrderBook> {
        let path = format!("{ORDER_BOOK_PATH}/{symbol}");
        let value = self.transport.send(ApiRequest::get(path)).await?;
        decode_object(value, "order book")
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let value = self.transport.send(ApiRequest::get(LEADERBOARD_PATH)).await?;
        decode_list(value, "leaderboard entries")
    }
}

fn decode_object<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    if !value.is_object() {
        return Err(Error::Shape(format!(
            "expected {what} object, got {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| Error::Shape(format!("{what}: {e}")))
}

/// `null` is an empty list; the exchange encodes an empty result that way.
fn decode_list<T: DeserializeOwned>(value: Value, what: &str) -> Result<Vec<T>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    if !value.is_array() {
        return Err(Error::Shape(format!(
            "expected a list of {what}, got {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| Error::Shape(format!("{what}: {e}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
