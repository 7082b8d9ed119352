use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use common::{ApiRequest, Error, ExchangeTransport, Method, Result};

use crate::response::classify;

pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Plain REST client for the simulated exchange. Every request carries the
/// API key header; nothing is signed.
pub struct RestTransport {
    base_url: String,
    api_key: String,
    http: Client,
}

impl RestTransport {
    pub fn new(base_url: &Url, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and classify the response. Shared with
    /// `SignedTransport`, which only rewrites the query beforehand.
    pub(crate) async fn execute(&self, request: &ApiRequest) -> Result<Value> {
        let url = format!("{}{}", self.base_url, request.path);

        let builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Delete => self.http.delete(&url),
        };
        let mut builder = builder
            .header(API_KEY_HEADER, &self.api_key)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, url = %url, params = request.query.len(), "Sending request");

        let resp = builder
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        debug!(status = status.as_u16(), bytes = body.len(), "Response received");
        classify(status.as_u16(), &body)
    }
}

#[async_trait]
impl ExchangeTransport for RestTransport {
    fn name(&self) -> &str {
        "rest"
    }

    async fn send(&self, request: ApiRequest) -> Result<Value> {
        self.execute(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let url = Url::parse("http://localhost:8080/").unwrap();
        let t = RestTransport::new(&url, "key").unwrap();
        assert_eq!(t.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        // Port 9 (discard) is not expected to have an HTTP listener.
        let url = Url::parse("http://127.0.0.1:9").unwrap();
        let t = RestTransport::new(&url, "key").unwrap();
        let err = t
            .send(ApiRequest::get("/api/v3/account"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    }
}
