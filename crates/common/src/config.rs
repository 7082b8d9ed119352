use url::Url;

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
/// The simulated exchange accepts any secret; signatures are not verified.
pub const DEFAULT_SECRET: &str = "dummy-secret";

/// What a single run of the harness does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Action {
    /// Run the full smoke-test sequence.
    #[default]
    Full,
    /// Query account balances and positions.
    Account,
    /// Place one BUY order (cancelled afterwards unless --no-cancel).
    Create,
    /// List open orders and trade history.
    Query,
    /// Cancel every open order for the symbol.
    Cancel,
    /// Show the order book for the symbol.
    Orderbook,
    /// Show exchange symbol metadata.
    Info,
    /// Show the strategy leaderboard.
    Leaderboard,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Full => "full",
            Action::Account => "account",
            Action::Create => "create",
            Action::Query => "query",
            Action::Cancel => "cancel",
            Action::Orderbook => "orderbook",
            Action::Info => "info",
            Action::Leaderboard => "leaderboard",
        };
        write!(f, "{s}")
    }
}

/// Which `ExchangeTransport` implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TransportKind {
    /// Plain REST calls authenticated with the API-key header.
    #[default]
    Rest,
    /// REST calls with a timestamp and HMAC-SHA256 signature appended.
    Signed,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Rest => write!(f, "rest"),
            TransportKind::Signed => write!(f, "signed"),
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    /// API key with the middle elided, e.g. `abcd1234...wxyz`.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        let head: String = chars.iter().take(8).collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.masked_key())
            .finish_non_exhaustive()
    }
}

/// Everything one run needs, validated once at startup.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub credentials: Credentials,
    pub base_url: Url,
    pub symbol: String,
    pub action: Action,
    pub no_cancel: bool,
    pub price: f64,
    pub quantity: f64,
    pub leverage: u32,
    pub transport: TransportKind,
}

impl HarnessConfig {
    /// Config with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(api_key, DEFAULT_SECRET),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            symbol: DEFAULT_SYMBOL.to_string(),
            action: Action::default(),
            no_cancel: false,
            price: 65_000.0,
            quantity: 0.01,
            leverage: 10,
            transport: TransportKind::default(),
        }
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }

    /// Reject values the exchange would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if self.credentials.api_key.trim().is_empty() {
            return Err(Error::Config("API key must not be empty".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(Error::Config("symbol must not be empty".into()));
        }
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(Error::Config(format!("price must be positive, got {}", self.price)));
        }
        if !(self.quantity.is_finite() && self.quantity > 0.0) {
            return Err(Error::Config(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        if self.leverage == 0 {
            return Err(Error::Config("leverage must be at least 1".into()));
        }
        Ok(())
    }
}

/// Parse and normalise a base URL. Only http and https are accepted and a
/// trailing slash is dropped so paths can be appended directly.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| Error::Config(format!("invalid base URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "base URL must be http or https, got '{other}'"
        ))),
    }
}
