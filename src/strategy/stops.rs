//! Stop-price selector
//!
//! Maps a stop model name, an enriched sequence and an intended side to a
//! single protective stop price. A model whose indicator is still in
//! warm-up — or an unrecognized model name — yields no stop rather than an
//! error: callers treat a missing stop as an unprotected position, not as
//! a reason to abort trading.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::indicators::{swing_points, EnrichedCandle, SWING_LOOKBACK};
use crate::types::Side;

/// Fixed-percent stop distance (0.5% of close)
const FIXED_STOP_PCT: f64 = 0.005;

/// Protective stop models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopModel {
    /// Close offset by a multiple of ATR(14)
    Atr,
    /// The current SuperTrend line, regardless of side
    SuperTrend,
    /// Most recent confirmed swing low (buys only; sells fall back to ATR)
    Structure,
    /// Fixed 0.5% of close
    FixedPct,
}

impl StopModel {
    /// Parse a configuration name ("ATR", "SuperTrend", "Structure", "Fixed%")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "atr" => Some(StopModel::Atr),
            "supertrend" => Some(StopModel::SuperTrend),
            "structure" => Some(StopModel::Structure),
            "fixed%" | "fixedpct" => Some(StopModel::FixedPct),
            _ => None,
        }
    }
}

impl fmt::Display for StopModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopModel::Atr => write!(f, "ATR"),
            StopModel::SuperTrend => write!(f, "SuperTrend"),
            StopModel::Structure => write!(f, "Structure"),
            StopModel::FixedPct => write!(f, "Fixed%"),
        }
    }
}

/// Stop price for a model name; `None` for an unknown name. See [`stop_price`].
pub fn stop_for(name: &str, rows: &[EnrichedCandle], side: Side, atr_mult: f64) -> Option<f64> {
    StopModel::parse(name).and_then(|model| stop_price(model, rows, side, atr_mult))
}

/// Compute the stop price for `model` from the tail of an enriched sequence.
///
/// `None` means "no stop available": the sequence is empty, the model's
/// indicator is still undefined, or (Structure, Buy) has no confirmed swing
/// low and no ATR to fall back on.
pub fn stop_price(
    model: StopModel,
    rows: &[EnrichedCandle],
    side: Side,
    atr_mult: f64,
) -> Option<f64> {
    let last = rows.last()?;
    let close = last.close();

    match model {
        StopModel::Atr => last.atr14.map(|atr| match side {
            Side::Buy => close - atr_mult * atr,
            Side::Sell => close + atr_mult * atr,
        }),
        StopModel::SuperTrend => last.supertrend,
        StopModel::Structure => match side {
            Side::Buy => {
                let closes: Vec<f64> = rows.iter().map(|r| r.close()).collect();
                let (_, swing_low) = swing_points(&closes, SWING_LOOKBACK);
                swing_low
                    .map(|sp| sp.value)
                    .or_else(|| last.atr14.map(|atr| close - atr))
            }
            // Swing highs are ignored on the sell side; plain ATR offset
            Side::Sell => last.atr14.map(|atr| close + atr),
        },
        StopModel::FixedPct => Some(match side {
            Side::Buy => close * (1.0 - FIXED_STOP_PCT),
            Side::Sell => close * (1.0 + FIXED_STOP_PCT),
        }),
    }
}
