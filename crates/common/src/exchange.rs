use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A single REST call, relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new(Method::Post, path)
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter. Empty values are skipped so that an empty
    /// symbol means "all symbols".
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.query.push((key.to_string(), value));
        }
        self
    }
}

/// Abstraction over the wire used to reach the exchange.
///
/// `RestTransport` sends plain API-key requests, `SignedTransport` adds a
/// timestamp and HMAC signature the way Binance-style SDK clients do. The
/// harness only ever holds a `dyn ExchangeTransport`, so both are
/// interchangeable.
///
/// Implementations classify every response into JSON on success or one of
/// `Error::Transport`, `Error::Exchange` or `Error::Shape`.
#[async_trait]
pub trait ExchangeTransport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Send the request and return the decoded JSON payload.
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_are_dropped() {
        let req = ApiRequest::get("/api/v3/openOrders")
            .param("symbol", "")
            .param("limit", "5");
        assert_eq!(req.query, vec![("limit".to_string(), "5".to_string())]);
    }
}
