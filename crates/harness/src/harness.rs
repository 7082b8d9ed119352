use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use common::{
    CancelResult, Error, ExchangeTransport, OpenOrder, OrderRequest, OrderResult, OrderSide,
    Result, Trade,
};

use crate::api::ExchangeApi;
use crate::console::Console;
use crate::render;

/// Fixed delays inserted between dependent steps so the exchange can settle
/// (e.g. a new order becoming cancellable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Between steps of the full suite.
    pub step: Duration,
    /// Between creating an order and cancelling it in the `create` action.
    pub before_cancel: Duration,
    /// Between consecutive cancels in the `cancel` action.
    pub between_cancels: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(500),
            before_cancel: Duration::from_secs(1),
            between_cancels: Duration::from_millis(300),
        }
    }
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            step: Duration::ZERO,
            before_cancel: Duration::ZERO,
            between_cancels: Duration::ZERO,
        }
    }
}

/// Drives the exchange endpoints one request at a time and reports each
/// outcome on the console.
///
/// No operation returns an error. Transport, exchange and shape failures are
/// logged, printed, and turned into `false`, `None` or an empty list.
pub struct ExchangeTestHarness {
    api: ExchangeApi,
    console: Console,
    pacing: Pacing,
}

impl ExchangeTestHarness {
    pub fn new(transport: Arc<dyn ExchangeTransport>, console: Console) -> Self {
        Self {
            api: ExchangeApi::new(transport),
            console,
            pacing: Pacing::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn transport_name(&self) -> &str {
        self.api.transport_name()
    }

    pub(crate) async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    // ─── Operations ───────────────────────────────────────────────────────────

    pub async fn fetch_exchange_info(&self) -> bool {
        self.console.lines(render::section("Exchange info"));
        self.attempt("exchange_info", self.api.exchange_info(), render::exchange_info)
            .await
            .is_ok()
    }

    pub async fn fetch_account(&self) -> bool {
        self.console.lines(render::section("Account"));
        self.attempt("account", self.api.account(), render::account)
            .await
            .is_ok()
    }

    /// Place a LIMIT order. Returns the exchange's order id on success.
    pub async fn create_order(
        &self,
        symbol: &str,
        side: OrderSide,
        price: f64,
        quantity: f64,
        leverage: u32,
    ) -> Option<String> {
        self.create_order_checked(symbol, side, price, quantity, leverage)
            .await
            .ok()
            .map(|r| r.order_id)
    }

    /// Open orders for `symbol`; an empty symbol lists every symbol.
    pub async fn fetch_open_orders(&self, symbol: &str) -> Vec<OpenOrder> {
        self.open_orders_checked(symbol).await.unwrap_or_default()
    }

    pub async fn cancel_order(&self, order_id: &str, symbol: &str) -> bool {
        self.cancel_order_checked(order_id, symbol).await.is_ok()
    }

    /// Full trade history for `symbol`; only the first few are printed.
    pub async fn fetch_trades(&self, symbol: &str) -> Vec<Trade> {
        self.trades_checked(symbol).await.unwrap_or_default()
    }

    pub async fn fetch_order_book(&self, symbol: &str) -> bool {
        self.console.lines(render::section(&format!(
            "Order book ({})",
            render::symbol_label(symbol)
        )));
        self.attempt("order_book", self.api.order_book(symbol), render::order_book)
            .await
            .is_ok()
    }

    pub async fn fetch_leaderboard(&self) -> bool {
        self.console.lines(render::section("Leaderboard"));
        self.attempt("leaderboard", self.api.leaderboard(), |entries| {
            render::leaderboard(entries)
        })
        .await
        .is_ok()
    }

    // ─── Result-returning variants used by the suite ──────────────────────────

    pub(crate) async fn create_order_checked(
        &self,
        symbol: &str,
        side: OrderSide,
        price: f64,
        quantity: f64,
        leverage: u32,
    ) -> Result<OrderResult> {
        let order = OrderRequest::limit(symbol, side, price, quantity, leverage);
        self.console.lines(render::section("Creating order"));
        self.console.lines(render::order_request(&order));

        let result = self
            .attempt("create_order", self.api.create_order(&order), render::order_created)
            .await;
        if let Ok(created) = &result {
            info!(order_id = %created.order_id, symbol, side = %side, "Order created");
        }
        result
    }

    pub(crate) async fn open_orders_checked(&self, symbol: &str) -> Result<Vec<OpenOrder>> {
        self.console.lines(render::section(&format!(
            "Open orders ({})",
            render::symbol_label(symbol)
        )));
        self.attempt("open_orders", self.api.open_orders(symbol), |orders| {
            render::open_orders(orders)
        })
        .await
    }

    pub(crate) async fn cancel_order_checked(
        &self,
        order_id: &str,
        symbol: &str,
    ) -> Result<CancelResult> {
        self.console.lines(render::section("Cancelling order"));
        self.console.line(format!("    order id: {order_id}"));

        let result = self
            .attempt(
                "cancel_order",
                self.api.cancel_order(order_id, symbol),
                render::cancel_result,
            )
            .await;
        if result.is_ok() {
            info!(order_id, symbol, "Order cancelled");
        }
        result
    }

    pub(crate) async fn trades_checked(&self, symbol: &str) -> Result<Vec<Trade>> {
        self.console.lines(render::section(&format!(
            "Trade history ({})",
            render::symbol_label(symbol)
        )));
        self.attempt("my_trades", self.api.my_trades(symbol), |trades| {
            render::trades(trades)
        })
        .await
    }

    /// Await one exchange call, print its rendering or its failure.
    async fn attempt<T, F, R>(&self, op: &'static str, call: F, render: R) -> Result<T>
    where
        F: Future<Output = Result<T>>,
        R: FnOnce(&T) -> Vec<String>,
    {
        match call.await {
            Ok(value) => {
                self.console.lines(render(&value));
                Ok(value)
            }
            Err(e) => {
                self.report_failure(op, &e);
                Err(e)
            }
        }
    }

    pub(crate) fn report_failure(&self, op: &str, err: &Error) {
        warn!(op, transport = self.transport_name(), error = %err, "Operation failed");
        self.console.line(render::failure(err));
    }
}
