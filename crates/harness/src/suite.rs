use tracing::{info, warn};

use common::{Action, HarnessConfig, OrderSide};

use crate::harness::ExchangeTestHarness;
use crate::render;

/// Resting prices used by the full suite: far enough from the simulated
/// market (~67000) that neither order fills.
pub const SUITE_BUY_PRICE: f64 = 65_000.0;
pub const SUITE_SELL_PRICE: f64 = 75_000.0;
pub const SUITE_QUANTITY: f64 = 0.01;
pub const SUITE_LEVERAGE: u32 = 10;

/// One step of the full suite, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ExchangeInfo,
    Account,
    OrderBook,
    CreateBuy,
    CreateSell,
    OpenOrders,
    Trades,
    CancelBuy,
    CancelSell,
    OpenOrdersAfterCancel,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Step::ExchangeInfo => "exchange info",
            Step::Account => "account",
            Step::OrderBook => "order book",
            Step::CreateBuy => "create buy",
            Step::CreateSell => "create sell",
            Step::OpenOrders => "open orders",
            Step::Trades => "trades",
            Step::CancelBuy => "cancel buy",
            Step::CancelSell => "cancel sell",
            Step::OpenOrdersAfterCancel => "open orders after cancel",
        };
        write!(f, "{s}")
    }
}

/// Outcome of every step the suite executed.
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub outcomes: Vec<(Step, bool)>,
}

impl SuiteReport {
    fn record(&mut self, step: Step, ok: bool) {
        self.outcomes.push((step, ok));
    }

    pub fn steps(&self) -> Vec<Step> {
        self.outcomes.iter().map(|(s, _)| *s).collect()
    }

    pub fn failed(&self) -> Vec<Step> {
        self.outcomes
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(s, _)| *s)
            .collect()
    }

    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|(_, ok)| *ok)
    }
}

impl ExchangeTestHarness {
    /// Run the fixed smoke-test sequence. Returns `true` only if every
    /// executed step succeeded.
    pub async fn run_full_suite(&self, symbol: &str, cancel_after: bool) -> bool {
        self.run_full_suite_report(symbol, cancel_after)
            .await
            .passed()
    }

    /// Same as `run_full_suite`, returning the per-step outcomes. A failing
    /// step never stops the ones after it.
    pub async fn run_full_suite_report(&self, symbol: &str, cancel_after: bool) -> SuiteReport {
        let mut report = SuiteReport::default();
        let step_delay = self.pacing().step;

        self.console().lines(render::banner("Exchange API full test"));
        info!(symbol, cancel_after, "Full suite started");

        report.record(Step::ExchangeInfo, self.fetch_exchange_info().await);
        report.record(Step::Account, self.fetch_account().await);
        report.record(Step::OrderBook, self.fetch_order_book(symbol).await);

        let buy_id = self
            .create_order(
                symbol,
                OrderSide::Buy,
                SUITE_BUY_PRICE,
                SUITE_QUANTITY,
                SUITE_LEVERAGE,
            )
            .await;
        report.record(Step::CreateBuy, buy_id.is_some());
        self.pause(step_delay).await;

        let sell_id = self
            .create_order(
                symbol,
                OrderSide::Sell,
                SUITE_SELL_PRICE,
                SUITE_QUANTITY,
                SUITE_LEVERAGE,
            )
            .await;
        report.record(Step::CreateSell, sell_id.is_some());
        self.pause(step_delay).await;

        report.record(
            Step::OpenOrders,
            self.open_orders_checked(symbol).await.is_ok(),
        );
        report.record(Step::Trades, self.trades_checked(symbol).await.is_ok());

        if cancel_after {
            let ok = self.cancel_created(buy_id.as_deref(), symbol, "buy").await;
            report.record(Step::CancelBuy, ok);
            let ok = self.cancel_created(sell_id.as_deref(), symbol, "sell").await;
            report.record(Step::CancelSell, ok);

            self.pause(step_delay).await;
            report.record(
                Step::OpenOrdersAfterCancel,
                self.open_orders_checked(symbol).await.is_ok(),
            );
        }

        let total = report.outcomes.len();
        let passed = total - report.failed().len();
        self.console().line("");
        self.console().lines(render::banner(&format!(
            "Test finished: {passed}/{total} steps passed"
        )));
        if report.passed() {
            info!(symbol, steps = total, "Full suite passed");
        } else {
            let failed: Vec<String> = report.failed().iter().map(Step::to_string).collect();
            warn!(symbol, failed = ?failed, "Full suite finished with failures");
        }
        report
    }

    /// Cancel an order created earlier in the suite. Without an id (the
    /// create step failed) nothing is sent and the step counts as failed.
    async fn cancel_created(&self, order_id: Option<&str>, symbol: &str, label: &str) -> bool {
        match order_id {
            Some(id) => self.cancel_order(id, symbol).await,
            None => {
                self.console().lines(render::section("Cancelling order"));
                self.console()
                    .line(format!("    [-] skipped: no {label} order was created"));
                warn!(symbol, label, "Cancel skipped, create step failed");
                false
            }
        }
    }

    /// Run the action selected in the config. Returns whether everything it
    /// did succeeded; callers only log this.
    pub async fn run_action(&self, config: &HarnessConfig) -> bool {
        let symbol = config.symbol.as_str();
        self.console().lines([
            format!(
                "[*] Exchange: {} (transport: {})",
                config.base_url,
                self.transport_name()
            ),
            format!("[*] API key: {}", config.credentials.masked_key()),
        ]);
        info!(action = %config.action, symbol, "Running action");

        match config.action {
            Action::Full => self.run_full_suite(symbol, !config.no_cancel).await,
            Action::Account => self.fetch_account().await,
            Action::Create => {
                let order_id = self
                    .create_order(
                        symbol,
                        OrderSide::Buy,
                        config.price,
                        config.quantity,
                        config.leverage,
                    )
                    .await;
                match order_id {
                    Some(id) if !config.no_cancel => {
                        self.pause(self.pacing().before_cancel).await;
                        self.cancel_order(&id, symbol).await
                    }
                    Some(_) => true,
                    None => false,
                }
            }
            Action::Query => {
                let orders = self.open_orders_checked(symbol).await.is_ok();
                let trades = self.trades_checked(symbol).await.is_ok();
                orders && trades
            }
            Action::Cancel => self.cancel_all(symbol).await,
            Action::Orderbook => self.fetch_order_book(symbol).await,
            Action::Info => self.fetch_exchange_info().await,
            Action::Leaderboard => self.fetch_leaderboard().await,
        }
    }

    async fn cancel_all(&self, symbol: &str) -> bool {
        let orders = match self.open_orders_checked(symbol).await {
            Ok(orders) => orders,
            Err(_) => return false,
        };
        if orders.is_empty() {
            self.console().line("no orders to cancel");
            return true;
        }

        let mut all_ok = true;
        for (i, order) in orders.iter().enumerate() {
            if i > 0 {
                self.pause(self.pacing().between_cancels).await;
            }
            all_ok &= self.cancel_order(&order.order_id, symbol).await;
        }
        all_ok
    }
}
