//! SuperTrend transform
//!
//! Path-dependent trend band: each output depends on the previous output
//! and a running direction flag, so the recurrence is evaluated strictly
//! in time order rather than as a rolling window.

use super::series::atr;
use crate::types::Candle;

/// Compute the SuperTrend line over a candle sequence.
///
/// Bands are `hl2 ± multiplier * ATR(period)`. Direction starts at +1 and
/// flips when the close crosses the previous SuperTrend value; a close
/// exactly on the line leaves the direction unchanged. While up the line
/// ratchets along `max(lowerband, prev)`, while down along
/// `min(upperband, prev)`.
///
/// Output is undefined while ATR is undefined; the first defined row seeds
/// the line with its lower band.
pub fn supertrend(candles: &[Candle], period: usize, multiplier: f64) -> Vec<Option<f64>> {
    let atr_vals = atr(candles, period);
    let mut out = Vec::with_capacity(candles.len());
    let mut direction: i8 = 1;
    let mut prev: Option<f64> = None;

    for (c, atr_cell) in candles.iter().zip(atr_vals) {
        let atr_v = match atr_cell {
            Some(v) => v,
            None => {
                out.push(None);
                continue;
            }
        };
        let hl2 = (c.high + c.low) / 2.0;
        let upperband = hl2 + multiplier * atr_v;
        let lowerband = hl2 - multiplier * atr_v;

        let value = match prev {
            None => {
                direction = 1;
                lowerband
            }
            Some(p) => {
                if c.close > p {
                    direction = 1;
                } else if c.close < p {
                    direction = -1;
                }
                if direction == 1 {
                    lowerband.max(p)
                } else {
                    upperband.min(p)
                }
            }
        };
        prev = Some(value);
        out.push(Some(value));
    }
    out
}
