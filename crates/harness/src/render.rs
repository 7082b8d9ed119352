//! Console formatting for exchange responses. Pure functions returning the
//! lines to print, so the layout can be checked without a server.

use common::{
    AccountInfo, CancelResult, Error, ExchangeInfo, LeaderboardEntry, OpenOrder, OrderBook,
    OrderRequest, OrderResult, Trade,
};

/// How many symbols, trades and leaderboard rows are listed before the
/// remainder is summarised.
pub const PREVIEW_LIMIT: usize = 5;

const RULE_WIDTH: usize = 60;
const INDENT: &str = "    ";
const ITEM: &str = "      - ";

pub fn banner(title: &str) -> Vec<String> {
    let rule = "=".repeat(RULE_WIDTH);
    vec![rule.clone(), title.to_string(), rule]
}

/// Blank line followed by the `[+]` heading of an operation.
pub fn section(title: &str) -> Vec<String> {
    vec![String::new(), format!("[+] {title}...")]
}

pub fn failure(err: &Error) -> String {
    format!("{INDENT}[-] failed: {}", err.operator_message())
}

pub fn symbol_label(symbol: &str) -> &str {
    if symbol.is_empty() {
        "all symbols"
    } else {
        symbol
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".into())
}

fn more(total: usize) -> Option<String> {
    (total > PREVIEW_LIMIT).then(|| format!("{ITEM}... {} more", total - PREVIEW_LIMIT))
}

pub fn exchange_info(info: &ExchangeInfo) -> Vec<String> {
    let mut out = vec![format!("{INDENT}symbols: {}", info.symbols.len())];
    out.extend(info.symbols.iter().take(PREVIEW_LIMIT).map(|s| {
        format!(
            "{ITEM}{}: {}/{} ({})",
            s.symbol, s.base_asset, s.quote_asset, s.status
        )
    }));
    out.extend(more(info.symbols.len()));
    out
}

/// Only balances with something free or locked are listed.
pub fn account(acct: &AccountInfo) -> Vec<String> {
    let mut out = vec![format!(
        "{INDENT}account type: {}",
        acct.account_type.as_deref().unwrap_or("N/A")
    )];
    if let Some(can_trade) = acct.can_trade {
        out.push(format!("{INDENT}can trade: {can_trade}"));
    }

    let balances: Vec<_> = acct.balances.iter().filter(|b| !b.is_zero()).collect();
    out.push(format!("{INDENT}balances: {}", balances.len()));
    out.extend(balances.iter().map(|b| {
        format!("{ITEM}{}: free {}, locked {}", b.asset, b.free, b.locked)
    }));

    let positions: Vec<_> = acct.positions.iter().filter(|p| p.size != 0.0).collect();
    out.push(format!("{INDENT}open positions: {}", positions.len()));
    out.extend(positions.iter().map(|p| {
        format!("{ITEM}{}: {} {} @ {}", p.symbol, p.side, p.size, p.entry_price)
    }));
    out
}

pub fn order_request(order: &OrderRequest) -> Vec<String> {
    vec![
        format!("{INDENT}symbol: {}", order.symbol),
        format!("{INDENT}side: {}", order.side),
        format!("{INDENT}price: {}", order.price),
        format!("{INDENT}quantity: {}", order.quantity),
        format!("{INDENT}leverage: {}x", order.leverage),
    ]
}

pub fn order_created(result: &OrderResult) -> Vec<String> {
    vec![
        format!("{INDENT}[ok] order created"),
        format!("{INDENT}    order id: {}", result.order_id),
        format!("{INDENT}    status: {}", result.status),
        format!("{INDENT}    price: {}", opt(result.price)),
        format!("{INDENT}    quantity: {}", opt(result.orig_qty)),
    ]
}

pub fn open_orders(orders: &[OpenOrder]) -> Vec<String> {
    let mut out = vec![format!("{INDENT}open orders: {}", orders.len())];
    out.extend(orders.iter().map(|o| {
        format!(
            "{ITEM}id: {}, {} {} @ {}, status: {}",
            o.order_id, o.side, o.orig_qty, o.price, o.status
        )
    }));
    out
}

/// The exchange may omit the status; `CANCELLED` is shown in that case.
pub fn cancel_result(result: &CancelResult) -> Vec<String> {
    vec![
        format!("{INDENT}[ok] cancelled"),
        format!(
            "{INDENT}    status: {}",
            result.status.as_deref().unwrap_or("CANCELLED")
        ),
    ]
}

pub fn trades(trades: &[Trade]) -> Vec<String> {
    let mut out = vec![format!("{INDENT}trades: {}", trades.len())];
    out.extend(trades.iter().take(PREVIEW_LIMIT).map(|t| {
        let time = t
            .time
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "N/A".into());
        format!(
            "{ITEM}{time}: {} {} @ {}, fee: {}",
            t.side, t.qty, t.price, t.fee
        )
    }));
    out.extend(more(trades.len()));
    out
}

pub fn order_book(book: &OrderBook) -> Vec<String> {
    let mut out = vec![format!(
        "{INDENT}depth: {} bids / {} asks",
        book.bids.len(),
        book.asks.len()
    )];
    if let Some(bid) = book.best_bid() {
        out.push(format!("{INDENT}best bid: {} x {}", bid.price, bid.quantity));
    }
    if let Some(ask) = book.best_ask() {
        out.push(format!("{INDENT}best ask: {} x {}", ask.price, ask.quantity));
    }
    if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
        out.push(format!("{INDENT}spread: {:.2}", ask.price - bid.price));
    }
    out
}

pub fn leaderboard(entries: &[LeaderboardEntry]) -> Vec<String> {
    let mut out = vec![format!("{INDENT}strategies: {}", entries.len())];
    out.extend(entries.iter().take(PREVIEW_LIMIT).enumerate().map(|(i, e)| {
        format!(
            "{ITEM}#{} {}: pnl {}, roi {}, trades {} ({} won)",
            i + 1,
            e.name,
            e.total_pnl,
            e.roi,
            e.trade_count,
            e.win_count
        )
    }));
    out.extend(more(entries.len()));
    out
}
