pub mod config;
pub mod error;
pub mod exchange;
pub mod types;

pub use config::{Action, Credentials, HarnessConfig, TransportKind};
pub use error::{Error, Result};
pub use exchange::{ApiRequest, ExchangeTransport, Method};
pub use types::*;
