pub mod response;
pub mod rest;
pub mod signed;

use std::sync::Arc;

use tracing::info;

use common::{ExchangeTransport, HarnessConfig, Result, TransportKind};

pub use rest::RestTransport;
pub use signed::SignedTransport;

/// Build the transport selected in the config.
pub fn build(config: &HarnessConfig) -> Result<Arc<dyn ExchangeTransport>> {
    let transport: Arc<dyn ExchangeTransport> = match config.transport {
        TransportKind::Rest => Arc::new(RestTransport::new(
            &config.base_url,
            config.credentials.api_key.clone(),
        )?),
        TransportKind::Signed => {
            Arc::new(SignedTransport::new(&config.base_url, &config.credentials)?)
        }
    };
    info!(transport = transport.name(), base_url = %config.base_url, "Transport ready");
    Ok(transport)
}
