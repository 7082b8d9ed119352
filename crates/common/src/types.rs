use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// Side of an order or trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A LIMIT order to be submitted to the exchange. Built once per call.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub price: f64,
    pub quantity: f64,
    pub leverage: u32,
    pub client_order_id: String,
}

impl OrderRequest {
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        price: f64,
        quantity: f64,
        leverage: u32,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            price,
            quantity,
            leverage,
            client_order_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// JSON body for `POST /api/v3/order`. Price and quantity travel as
    /// decimal strings.
    pub fn to_body(&self) -> Value {
        json!({
            "symbol": self.symbol,
            "side": self.side.to_string(),
            "type": "LIMIT",
            "timeInForce": "GTC",
            "price": self.price.to_string(),
            "quantity": self.quantity.to_string(),
            "leverage": self.leverage,
            "newClientOrderId": self.client_order_id,
        })
    }
}

/// Acknowledgement returned by a create-order call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    #[serde(deserialize_with = "lenient::string")]
    pub order_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub orig_qty: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub executed_qty: Option<f64>,
}

/// Response to a cancel-order call. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResult {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    #[serde(deserialize_with = "lenient::string")]
    pub order_id: String,
    #[serde(default)]
    pub symbol: String,
    pub side: OrderSide,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub orig_qty: f64,
    #[serde(default)]
    pub status: String,
}

/// Trade time as sent by the exchange: RFC 3339 text or epoch millis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Millis(ms) => match DateTime::from_timestamp_millis(*ms) {
                Some(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.3f")),
                None => write!(f, "{ms}"),
            },
            Timestamp::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub symbol: String,
    pub side: OrderSide,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub qty: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub fee: f64,
    #[serde(default)]
    pub time: Option<Timestamp>,
}

/// One price level of an order book. Accepts `{"price","quantity"}`
/// objects as well as `[price, qty]` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct BookLevel {
    pub price: f64,
    pub quantity: f64,
}

impl TryFrom<Value> for BookLevel {
    type Error = String;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        let (price, quantity) = match &v {
            Value::Object(map) => (
                map.get("price"),
                map.get("quantity").or_else(|| map.get("qty")),
            ),
            Value::Array(items) => (items.first(), items.get(1)),
            _ => (None, None),
        };
        match (
            price.and_then(lenient::value_f64),
            quantity.and_then(lenient::value_f64),
        ) {
            (Some(price), Some(quantity)) => Ok(BookLevel { price, quantity }),
            _ => Err(format!("invalid order book level: {v}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub last_update_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub bids: Vec<BookLevel>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub asks: Vec<BookLevel>,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    pub asset: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub free: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub locked: f64,
}

impl Balance {
    pub fn is_zero(&self) -> bool {
        self.free == 0.0 && self.locked == 0.0
    }
}

/// An open position. Field names follow the simulated exchange's REST
/// payload (`size`, `entryPrice`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    #[serde(default)]
    pub side: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub size: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub entry_price: f64,
    #[serde(default)]
    pub leverage: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub unrealized_pnl: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub can_trade: Option<bool>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub balances: Vec<Balance>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub base_asset: String,
    #[serde(default)]
    pub quote_asset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

/// Row of the dashboard leaderboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub total_pnl: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub roi: f64,
    #[serde(default)]
    pub trade_count: u64,
    #[serde(default)]
    pub win_count: u64,
}

/// Deserializers tolerant of the exchange encoding numbers as strings and
/// lists as `null`.
mod lenient {
    use super::*;
    use serde::de::Error as _;

    pub fn value_f64(v: &Value) -> Option<f64> {
        match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(opt_f64(d)?.unwrap_or(0.0))
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            v => value_f64(&v)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected a number, got {v}"))),
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        opt_string(d)?.ok_or_else(|| D::Error::custom("expected a string or number, got null"))
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            v => Err(D::Error::custom(format!("expected a string or number, got {v}"))),
        }
    }

    pub fn vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
    }
}
