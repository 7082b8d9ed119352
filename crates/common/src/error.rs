use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network or HTTP layer failure: connection refused, timeout, or a
    /// non-2xx status whose body is not a recognisable exchange error.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Well-formed error object returned by the exchange.
    #[error("Exchange error {}: {msg}", code_label(.code))]
    Exchange { code: Option<i64>, msg: String },

    /// The response parsed but is not the shape the operation expects.
    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Message shown to the operator. For exchange errors this is the
    /// server's `msg` verbatim.
    pub fn operator_message(&self) -> String {
        match self {
            Error::Exchange { msg, .. } => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Shape(e.to_string())
    }
}

fn code_label(code: &Option<i64>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "-".into())
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
