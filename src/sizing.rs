//! Position sizing
//!
//! Converts the configured sizing mode into an order quantity: either a
//! fixed USD notional, or a risk fraction of account cash divided by the
//! per-unit distance to the protective stop.

use crate::types::Side;

/// Floor on the per-unit risk so a stop sitting on the price cannot
/// explode the quantity
const MIN_RISK_PER_UNIT: f64 = 1e-6;

/// How the order quantity is derived
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingMode {
    /// Spend a fixed USD notional
    UsdAmount(f64),
    /// Risk this fraction of account cash between entry and stop
    RiskPct(f64),
}

/// Estimate an order quantity.
///
/// Risk-% sizing needs a stop to measure per-unit risk; without one the
/// risk budget is spent as notional instead. Non-positive prices size to
/// zero.
pub fn position_qty(mode: SizingMode, price: f64, stop: Option<f64>, cash: f64) -> f64 {
    if price <= 0.0 || !price.is_finite() {
        return 0.0;
    }
    match mode {
        SizingMode::UsdAmount(usd) => (usd / price).max(0.0),
        SizingMode::RiskPct(pct) => {
            let budget = cash * pct;
            match stop {
                Some(stop) => {
                    let per_unit = (price - stop).abs().max(MIN_RISK_PER_UNIT);
                    (budget / per_unit).max(0.0)
                }
                None => (budget / price).max(0.0),
            }
        }
    }
}

/// Default intended side for a signal that is not an outright sell
pub fn default_side(direction: crate::types::Direction) -> Side {
    match direction {
        crate::types::Direction::Sell => Side::Sell,
        _ => Side::Buy,
    }
}
