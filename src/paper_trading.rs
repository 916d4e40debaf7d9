//! Paper Trading Ledger
//!
//! Simulates order execution against a virtual cash balance:
//! - **Fee/slippage modeling**: fills move against the trader by the
//!   configured slippage, fees are charged on notional per leg
//! - **Guardrails**: a fixed 2% daily realized-loss limit and a
//!   configurable max-trades-per-day cap, both checked at placement time
//! - **Audit trail**: every fill is an append-only record whose list index
//!   is its order id; closing mutates only status/exit/P&L
//! - **Daily counters**: trades-today resets on first access after the
//!   calendar date changes, no timers involved
//!
//! The ledger is an explicitly constructed object owned by the caller.
//! It holds no locks; concurrent callers must serialize `place` and
//! `close_position` themselves.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::types::{Side, Symbol};

/// Fixed daily realized-loss limit as a fraction of cash. Not configurable.
const DAILY_LOSS_LIMIT_PCT: f64 = 0.02;
/// Maximum rows returned by the display projection
const PROJECTION_ROWS: usize = 200;
/// Basis points per unit
const BPS: f64 = 10_000.0;

/// Stop, take-profit and trailing levels attached to an order.
/// Descriptive metadata only: nothing in the ledger monitors or triggers it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bracket {
    pub stop: Option<f64>,
    pub take_profit: Option<f64>,
    pub trailing_atr_mult: Option<f64>,
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Filled,
    Closed,
}

/// One simulated fill. Immutable once created, except for the close fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperOrder {
    /// Fill time
    pub ts: DateTime<Utc>,
    pub symbol: Symbol,
    pub side: Side,
    pub qty: f64,
    /// Fill price, slippage already applied
    pub entry: f64,
    pub fees_bps: f64,
    pub slippage_bps: f64,
    pub bracket: Bracket,
    pub status: OrderStatus,
    pub exit_price: Option<f64>,
    pub pnl_usd: Option<f64>,
}

/// Ledger failures surfaced to the caller. All recoverable.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    /// Placement refused by the daily guardrails
    #[error("daily guardrails reached: {reason}")]
    Guardrail { reason: String },
    /// Order id outside the history
    #[error("unknown order id {0}")]
    UnknownOrder(usize),
    /// Quantity must be strictly positive
    #[error("invalid quantity {0}")]
    InvalidQuantity(f64),
}

/// Display projection of one order, money rounded to cents
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRow {
    pub id: usize,
    pub time: String,
    pub symbol: String,
    pub side: Side,
    pub qty: f64,
    pub entry: f64,
    pub exit: Option<f64>,
    pub pnl_usd: Option<f64>,
    pub status: OrderStatus,
    pub stop: Option<f64>,
    pub tp: Option<f64>,
    pub trail_atr: Option<f64>,
}

/// Simulated trading ledger: cash, net positions, order history and
/// per-day guardrail counters.
#[derive(Debug)]
pub struct PaperLedger {
    cash: f64,
    positions: HashMap<Symbol, f64>,
    orders: Vec<PaperOrder>,
    realized_pnl: f64,
    max_trades_per_day: u32,
    trades_today: u32,
    last_reset_day: NaiveDate,
    /// Fixed calendar day for deterministic simulation; wall clock when unset
    today_override: Option<NaiveDate>,
}

impl PaperLedger {
    /// New ledger with a starting cash balance and the default 20-trade cap
    pub fn new(starting_cash: f64) -> Self {
        let today = Utc::now().date_naive();
        Self {
            cash: starting_cash,
            positions: HashMap::new(),
            orders: Vec::new(),
            realized_pnl: 0.0,
            max_trades_per_day: 20,
            trades_today: 0,
            last_reset_day: today,
            today_override: None,
        }
    }

    pub fn set_max_trades_per_day(&mut self, max: u32) {
        self.max_trades_per_day = max;
    }

    /// Pin the ledger's notion of "today" (simulation/testing). `None`
    /// returns to the wall clock.
    pub fn set_today(&mut self, day: Option<NaiveDate>) {
        self.today_override = day;
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    /// Signed net quantity for a symbol (0 when never traded)
    pub fn position(&self, symbol: Symbol) -> f64 {
        self.positions.get(&symbol).copied().unwrap_or(0.0)
    }

    pub fn orders(&self) -> &[PaperOrder] {
        &self.orders
    }

    pub fn order(&self, id: usize) -> Option<&PaperOrder> {
        self.orders.get(id)
    }

    pub fn trades_today(&mut self) -> u32 {
        self.reset_if_new_day();
        self.trades_today
    }

    fn current_day(&self) -> NaiveDate {
        self.today_override.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn reset_if_new_day(&mut self) {
        let today = self.current_day();
        if today != self.last_reset_day {
            debug!(%today, "new trading day, resetting daily counters");
            self.trades_today = 0;
            self.last_reset_day = today;
        }
    }

    fn guardrail_breach(&mut self) -> Option<String> {
        self.reset_if_new_day();
        if self.realized_pnl < -DAILY_LOSS_LIMIT_PCT * self.cash {
            return Some(format!(
                "realized P&L {:.2} below {:.0}% loss limit",
                self.realized_pnl,
                DAILY_LOSS_LIMIT_PCT * 100.0
            ));
        }
        if self.trades_today >= self.max_trades_per_day {
            return Some(format!(
                "max trades per day ({}) reached",
                self.max_trades_per_day
            ));
        }
        None
    }

    /// Whether the guardrails currently allow a new placement. Advisory:
    /// existing positions are never blocked or unwound.
    pub fn can_trade(&mut self) -> bool {
        self.guardrail_breach().is_none()
    }

    /// Place a simulated order.
    ///
    /// The fill price moves against the trader by the slippage rate; the
    /// fee is charged on the filled notional. Cash and the symbol's net
    /// position are adjusted, the order is appended to the history, and
    /// its id (the history index) is returned. There are no exposure
    /// bounds: shorts and leverage are allowed by design.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        &mut self,
        symbol: Symbol,
        side: Side,
        qty: f64,
        price: f64,
        fees_bps: f64,
        slippage_bps: f64,
        bracket: Bracket,
    ) -> Result<usize, LedgerError> {
        if !qty.is_finite() || qty <= 0.0 {
            return Err(LedgerError::InvalidQuantity(qty));
        }
        if let Some(reason) = self.guardrail_breach() {
            return Err(LedgerError::Guardrail { reason });
        }

        let fill = price * (1.0 + side.sign() * slippage_bps / BPS);
        let fee = fill * qty * (fees_bps / BPS);
        let cost = match side {
            Side::Buy => fill * qty + fee,
            Side::Sell => -(fill * qty - fee),
        };
        self.cash -= cost;
        *self.positions.entry(symbol).or_insert(0.0) += side.sign() * qty;

        self.orders.push(PaperOrder {
            ts: Utc::now(),
            symbol,
            side,
            qty,
            entry: fill,
            fees_bps,
            slippage_bps,
            bracket,
            status: OrderStatus::Filled,
            exit_price: None,
            pnl_usd: None,
        });
        self.trades_today += 1;

        let id = self.orders.len() - 1;
        info!(%symbol, %side, qty, fill, fee, cash = self.cash, id, "paper order filled");
        Ok(id)
    }

    /// Close an order at `price`, realizing P&L net of the exit-leg fee.
    ///
    /// No-op when already closed. The symbol's net-position entry is left
    /// untouched: the order history, not the position map, is the audit
    /// trail for closed trades.
    pub fn close_position(&mut self, id: usize, price: f64) -> Result<(), LedgerError> {
        let order = self
            .orders
            .get_mut(id)
            .ok_or(LedgerError::UnknownOrder(id))?;
        if order.status == OrderStatus::Closed {
            debug!(id, "close ignored, order already closed");
            return Ok(());
        }

        let signed_qty = order.side.sign() * order.qty;
        let fee = price * order.qty * (order.fees_bps / BPS);
        let pnl = (price - order.entry) * signed_qty - fee;

        order.exit_price = Some(price);
        order.pnl_usd = Some(pnl);
        order.status = OrderStatus::Closed;

        self.realized_pnl += pnl;
        // Exit leg: a long close sells (credits), a short close buys back (debits)
        self.cash += price * signed_qty - fee;

        info!(id, exit = price, pnl, cash = self.cash, "position closed");
        Ok(())
    }

    /// Read-only display view: most recent first, at most 200 rows,
    /// monetary fields rounded to 2 decimals and quantity to 8.
    pub fn projection(&self) -> Vec<LedgerRow> {
        self.orders
            .iter()
            .enumerate()
            .rev()
            .take(PROJECTION_ROWS)
            .map(|(id, o)| LedgerRow {
                id,
                time: o.ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                symbol: o.symbol.to_string(),
                side: o.side,
                qty: round_dp(o.qty, 8),
                entry: round_dp(o.entry, 2),
                exit: o.exit_price.map(|p| round_dp(p, 2)),
                pnl_usd: o.pnl_usd.map(|p| round_dp(p, 2)),
                status: o.status,
                stop: o.bracket.stop,
                tp: o.bracket.take_profit,
                trail_atr: o.bracket.trailing_atr_mult,
            })
            .collect()
    }
}

fn round_dp(x: f64, dp: u32) -> f64 {
    let scale = 10f64.powi(dp as i32);
    (x * scale).round() / scale
}
