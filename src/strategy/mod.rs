//! Signal engine
//!
//! Fuses five independent directional checks over the most recent enriched
//! row into a bounded integer score and a trade signal:
//! - EMA bias with a slope filter (fast EMA change across the last 2 steps)
//! - RSI strength / weakness thresholds (55 / 45)
//! - VWAP bias (equality counts as bearish)
//! - SuperTrend side (equality counts as bullish)
//! - Bollinger regime tag (rationale only, never a vote)
//!
//! Undefined indicator cells cast no vote and add no rationale entry:
//! insufficient history must never read as a directional opinion. The
//! rationale preserves the fixed check order above; its exact texts are
//! part of the observable contract.

use serde::Serialize;
use tracing::debug;

use crate::indicators::EnrichedCandle;
use crate::types::Direction;

pub mod stops;

pub use stops::{stop_for, stop_price, StopModel};

/// RSI vote thresholds
const RSI_STRONG: f64 = 55.0;
const RSI_WEAK: f64 = 45.0;
/// Bollinger width / middle below this ratio tags a squeeze
const SQUEEZE_WIDTH: f64 = 0.01;
/// Scores at or beyond this magnitude become directional
const SCORE_GATE: i32 = 2;

/// Directional trading signal with its vote tally and fired-rule rationale
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signal {
    pub direction: Direction,
    /// Sum of the directional votes, in [-4, +4]
    pub score: i32,
    /// "; "-joined fired rule texts, in fixed check order
    pub rationale: String,
}

/// Generate a signal from the tail of an enriched sequence.
///
/// Only the last row is read, except for the EMA slope filter which also
/// reads the row three steps back. Sequences too short for the slope check
/// (or still in indicator warm-up) simply cast fewer votes.
pub fn generate_signal(rows: &[EnrichedCandle]) -> Signal {
    let mut score = 0;
    let mut rationale: Vec<String> = Vec::new();

    let last = match rows.last() {
        Some(last) => last,
        None => {
            return Signal {
                direction: Direction::Neutral,
                score: 0,
                rationale: String::new(),
            }
        }
    };
    let close = last.close();

    // EMA bias + slope filter over the last 2 steps
    if rows.len() >= 3 {
        let slope = last.ema9 - rows[rows.len() - 3].ema9;
        if last.ema9 > last.ema21 && slope > 0.0 {
            score += 1;
            rationale.push("EMA9>EMA21 ↑".to_string());
        } else if last.ema9 < last.ema21 && slope < 0.0 {
            score -= 1;
            rationale.push("EMA9<EMA21 ↓".to_string());
        }
    }

    // RSI
    if let Some(rsi) = last.rsi14 {
        if rsi > RSI_STRONG {
            score += 1;
            rationale.push(format!("RSI {rsi:.0} strong"));
        } else if rsi < RSI_WEAK {
            score -= 1;
            rationale.push(format!("RSI {rsi:.0} weak"));
        }
    }

    // VWAP bias: equality counts as bearish
    if let Some(vwap) = last.vwap {
        if close > vwap {
            score += 1;
            rationale.push("Above VWAP".to_string());
        } else {
            score -= 1;
            rationale.push("Below VWAP".to_string());
        }
    }

    // SuperTrend: equality counts as bullish
    if let Some(st) = last.supertrend {
        if close >= st {
            score += 1;
            rationale.push("SuperTrend up".to_string());
        } else {
            score -= 1;
            rationale.push("SuperTrend down".to_string());
        }
    }

    // Bollinger regime tag, never a vote
    if let (Some(mid), Some(up), Some(lo)) = (last.bb_mid, last.bb_up, last.bb_lo) {
        if mid != 0.0 {
            let width = (up - lo) / mid;
            rationale.push(if width < SQUEEZE_WIDTH {
                "Squeeze".to_string()
            } else {
                "Expanded".to_string()
            });
        }
    }

    let direction = if score >= SCORE_GATE {
        Direction::Buy
    } else if score <= -SCORE_GATE {
        Direction::Sell
    } else {
        Direction::Neutral
    };

    debug!(%direction, score, votes = rationale.len(), "signal generated");

    Signal {
        direction,
        score,
        rationale: rationale.join("; "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Candle;
    use chrono::{TimeZone, Utc};

    fn bare_row(i: usize, close: f64) -> EnrichedCandle {
        EnrichedCandle {
            candle: Candle {
                ts: Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10.0,
            },
            ema9: close,
            ema21: close,
            rsi14: None,
            vwap: None,
            atr14: None,
            bb_mid: None,
            bb_up: None,
            bb_lo: None,
            supertrend: None,
            vwap_z: None,
        }
    }

    /// Three rows where each check of the last row casts the requested vote
    fn rows_for_votes(ema: i32, rsi: i32, vwap: i32, st: i32) -> Vec<EnrichedCandle> {
        let close = 100.0;
        let mut rows: Vec<EnrichedCandle> = (0..3).map(|i| bare_row(i, close)).collect();

        // Slope reads ema9 three rows back; bias reads ema9 vs ema21
        let (ema9_old, ema9_now, ema21) = match ema {
            1 => (90.0, 110.0, 100.0),
            -1 => (110.0, 90.0, 100.0),
            _ => (100.0, 100.0, 100.0),
        };
        rows[0].ema9 = ema9_old;
        rows[2].ema9 = ema9_now;
        rows[2].ema21 = ema21;

        rows[2].rsi14 = Some(match rsi {
            1 => 60.0,
            -1 => 40.0,
            _ => 50.0,
        });
        rows[2].vwap = Some(if vwap == 1 { close - 5.0 } else { close + 5.0 });
        rows[2].supertrend = Some(if st == 1 { close - 5.0 } else { close + 5.0 });
        rows
    }

    #[test]
    fn test_score_mapping_exhaustive() {
        for ema in [-1, 0, 1] {
            for rsi in [-1, 0, 1] {
                for vwap in [-1, 1] {
                    for st in [-1, 1] {
                        let sig = generate_signal(&rows_for_votes(ema, rsi, vwap, st));
                        let expected = ema + rsi + vwap + st;
                        assert_eq!(sig.score, expected);
                        let want = if expected >= 2 {
                            Direction::Buy
                        } else if expected <= -2 {
                            Direction::Sell
                        } else {
                            Direction::Neutral
                        };
                        assert_eq!(sig.direction, want, "votes {ema},{rsi},{vwap},{st}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_rationale_text_and_order_bullish() {
        let mut rows = rows_for_votes(1, 1, 1, 1);
        rows[2].rsi14 = Some(62.0);
        // Tight bands: width / mid < 1%
        rows[2].bb_mid = Some(100.0);
        rows[2].bb_up = Some(100.4);
        rows[2].bb_lo = Some(99.6);

        let sig = generate_signal(&rows);
        assert_eq!(sig.score, 4);
        assert_eq!(sig.direction, Direction::Buy);
        assert_eq!(
            sig.rationale,
            "EMA9>EMA21 ↑; RSI 62 strong; Above VWAP; SuperTrend up; Squeeze"
        );
    }

    #[test]
    fn test_rationale_text_and_order_bearish() {
        let mut rows = rows_for_votes(-1, -1, -1, -1);
        rows[2].rsi14 = Some(38.0);
        rows[2].bb_mid = Some(100.0);
        rows[2].bb_up = Some(103.0);
        rows[2].bb_lo = Some(97.0);

        let sig = generate_signal(&rows);
        assert_eq!(sig.score, -4);
        assert_eq!(sig.direction, Direction::Sell);
        assert_eq!(
            sig.rationale,
            "EMA9<EMA21 ↓; RSI 38 weak; Below VWAP; SuperTrend down; Expanded"
        );
    }

    #[test]
    fn test_vwap_equality_is_bearish_and_supertrend_tie_bullish() {
        let mut rows = rows_for_votes(0, 0, 1, 1);
        rows[2].vwap = Some(rows[2].close());
        rows[2].supertrend = Some(rows[2].close());
        let sig = generate_signal(&rows);
        assert_eq!(sig.rationale, "Below VWAP; SuperTrend up");
        assert_eq!(sig.score, 0);
    }

    #[test]
    fn test_equal_emas_cast_no_vote() {
        // Rising fast EMA but no bias separation
        let mut rows = rows_for_votes(0, 0, 1, 1);
        rows[0].ema9 = 90.0;
        let sig = generate_signal(&rows);
        assert!(!sig.rationale.contains("EMA"));
    }

    #[test]
    fn test_undefined_cells_cast_no_votes() {
        // All indicator cells None: nothing fires, nothing in the rationale
        let rows: Vec<EnrichedCandle> = (0..3).map(|i| bare_row(i, 100.0)).collect();
        let sig = generate_signal(&rows);
        assert_eq!(sig.score, 0);
        assert_eq!(sig.direction, Direction::Neutral);
        assert_eq!(sig.rationale, "");
    }

    #[test]
    fn test_short_sequence_skips_slope_check() {
        let mut rows = vec![bare_row(0, 100.0)];
        rows[0].ema9 = 110.0;
        rows[0].ema21 = 100.0;
        let sig = generate_signal(&rows);
        assert_eq!(sig.score, 0);
        assert_eq!(sig.rationale, "");
    }

    #[test]
    fn test_empty_sequence_is_neutral() {
        let sig = generate_signal(&[]);
        assert_eq!(sig.direction, Direction::Neutral);
        assert_eq!(sig.score, 0);
    }
}
