use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::config::{DEFAULT_BASE_URL, DEFAULT_SECRET, DEFAULT_SYMBOL};
use common::{Action, Credentials, HarnessConfig, TransportKind};
use harness::{Console, ExchangeTestHarness};

const EXAMPLES: &str = "\
Examples:
  # Full test
  exchange-tester --api-key YOUR_API_KEY

  # Custom exchange URL
  exchange-tester --api-key YOUR_API_KEY --url http://192.168.1.100:8080

  # Another symbol
  exchange-tester --api-key YOUR_API_KEY --symbol ETHUSDT

  # Account only
  exchange-tester --api-key YOUR_API_KEY --action account

  # Leave the test order resting for manual checks
  exchange-tester --api-key YOUR_API_KEY --action create --no-cancel";

#[derive(Parser, Debug)]
#[command(name = "exchange-tester")]
#[command(about = "REST API test harness for the HFT simulated exchange")]
#[command(after_help = EXAMPLES)]
struct Args {
    /// API key sent as X-MBX-APIKEY
    #[arg(long, env = "HFT_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Exchange base URL
    #[arg(long, env = "HFT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Trading pair
    #[arg(long, default_value = DEFAULT_SYMBOL)]
    symbol: String,

    /// What to run
    #[arg(long, value_enum, default_value_t = Action::Full)]
    action: Action,

    /// Do not cancel orders created by the run (for manual inspection)
    #[arg(long, default_value_t = false)]
    no_cancel: bool,

    /// Limit price for --action create
    #[arg(long, default_value_t = 65000.0)]
    price: f64,

    /// Order quantity for --action create
    #[arg(long, default_value_t = 0.01)]
    quantity: f64,

    /// Leverage for --action create
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=125))]
    leverage: u32,

    /// Request transport
    #[arg(long, value_enum, default_value_t = TransportKind::Rest)]
    transport: TransportKind,

    /// Signing secret for --transport signed
    #[arg(long, env = "HFT_API_SECRET", default_value = DEFAULT_SECRET, hide_env_values = true)]
    secret: String,
}

impl Args {
    fn into_config(self) -> common::Result<HarnessConfig> {
        let mut config = HarnessConfig::new(self.api_key.clone()).with_base_url(&self.url)?;
        config.credentials = Credentials::new(self.api_key, self.secret);
        config.symbol = self.symbol;
        config.action = self.action;
        config.no_cancel = self.no_cancel;
        config.price = self.price;
        config.quantity = self.quantity;
        config.leverage = self.leverage;
        config.transport = self.transport;
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // ── Config ────────────────────────────────────────────────────────────────
    let _ = dotenvy::dotenv(); // ignore error if .env not present
    let args = Args::parse();

    // ── Logging (stderr; stdout carries the report) ───────────────────────────
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = args.into_config().context("invalid configuration")?;

    // ── Transport + harness ───────────────────────────────────────────────────
    let transport = transport::build(&config).context("failed to set up transport")?;
    let harness = ExchangeTestHarness::new(transport, Console::stdout());

    // Step failures are reported on the console; the exit code stays 0.
    let ok = harness.run_action(&config).await;
    info!(action = %config.action, ok, "Run finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let args = Args::try_parse_from(["exchange-tester", "--api-key", "k"]).unwrap();
        let cfg = args.into_config().unwrap();
        assert_eq!(cfg.action, Action::Full);
        assert_eq!(cfg.symbol, "BTCUSDT");
        assert_eq!(cfg.price, 65000.0);
        assert_eq!(cfg.quantity, 0.01);
        assert_eq!(cfg.leverage, 10);
        assert!(!cfg.no_cancel);
        assert_eq!(cfg.transport, TransportKind::Rest);
        assert_eq!(cfg.credentials.secret, DEFAULT_SECRET);
    }

    #[test]
    fn all_flags_parse() {
        let args = Args::try_parse_from([
            "exchange-tester",
            "--api-key",
            "k",
            "--url",
            "http://10.0.0.5:9000/",
            "--symbol",
            "ETHUSDT",
            "--action",
            "orderbook",
            "--no-cancel",
            "--price",
            "3400.5",
            "--quantity",
            "0.5",
            "--leverage",
            "20",
            "--transport",
            "signed",
        ])
        .unwrap();
        let cfg = args.into_config().unwrap();
        assert_eq!(cfg.base_url.as_str(), "http://10.0.0.5:9000/");
        assert_eq!(cfg.action, Action::Orderbook);
        assert!(cfg.no_cancel);
        assert_eq!(cfg.price, 3400.5);
        assert_eq!(cfg.leverage, 20);
        assert_eq!(cfg.transport, TransportKind::Signed);
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(Args::try_parse_from(["exchange-tester", "--api-key", "k", "--action", "dance"]).is_err());
    }

    #[test]
    fn leverage_out_of_range_is_rejected() {
        assert!(Args::try_parse_from(["exchange-tester", "--api-key", "k", "--leverage", "0"]).is_err());
        assert!(Args::try_parse_from(["exchange-tester", "--api-key", "k", "--leverage", "126"]).is_err());
    }

    #[test]
    fn bad_url_fails_config() {
        let args = Args::try_parse_from(["exchange-tester", "--api-key", "k", "--url", "localhost"]).unwrap();
        assert!(args.into_config().is_err());
    }
}
