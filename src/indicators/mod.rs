//! Indicator pipeline
//!
//! Turns a raw candle sequence into an enriched sequence carrying the full
//! indicator set the signal engine and stop models read: EMA 9/21, RSI 14,
//! cumulative VWAP, ATR 14, Bollinger 20/2.0, SuperTrend 10/3.0 and a
//! 50-row z-score of close - VWAP.

use serde::Serialize;

use crate::types::{validate_candles, Candle, CandleError};

pub mod series;
pub mod supertrend;

pub use series::{swing_points, SwingPoint};

/// EMA spans for the fast/slow bias pair
pub const EMA_FAST_SPAN: usize = 9;
pub const EMA_SLOW_SPAN: usize = 21;
/// RSI lookback
pub const RSI_LENGTH: usize = 14;
/// ATR lookback
pub const ATR_LENGTH: usize = 14;
/// Bollinger window and band width
pub const BB_LENGTH: usize = 20;
pub const BB_MULT: f64 = 2.0;
/// SuperTrend period and multiplier
pub const SUPERTREND_PERIOD: usize = 10;
pub const SUPERTREND_MULT: f64 = 3.0;
/// Window for the close - VWAP z-score
pub const VWAP_Z_WINDOW: usize = 50;
/// Centered window for swing-point confirmation
pub const SWING_LOOKBACK: usize = 5;

/// One candle plus its derived indicator cells.
///
/// `None` cells are warm-up rows with insufficient history. The EMAs are
/// seeded from the first row and always defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnrichedCandle {
    /// The source candle, carried through untouched
    pub candle: Candle,
    pub ema9: f64,
    pub ema21: f64,
    pub rsi14: Option<f64>,
    pub vwap: Option<f64>,
    pub atr14: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_up: Option<f64>,
    pub bb_lo: Option<f64>,
    pub supertrend: Option<f64>,
    pub vwap_z: Option<f64>,
}

impl EnrichedCandle {
    pub fn close(&self) -> f64 {
        self.candle.close
    }
}

/// Enrich a candle sequence with the full indicator set.
///
/// Validates the input first and fails fast on malformed data; the input
/// itself is never mutated. Warm-up rows carry `None` cells, which is
/// expected for sequences shorter than the largest window (50) plus margin.
pub fn enrich(candles: &[Candle]) -> Result<Vec<EnrichedCandle>, CandleError> {
    validate_candles(candles)?;

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema9 = series::ema(&closes, EMA_FAST_SPAN);
    let ema21 = series::ema(&closes, EMA_SLOW_SPAN);
    let rsi14 = series::rsi(&closes, RSI_LENGTH);
    let vwap = series::vwap(candles);
    let atr14 = series::atr(candles, ATR_LENGTH);
    let (bb_mid, bb_up, bb_lo) = series::bollinger_bands(&closes, BB_LENGTH, BB_MULT);
    let st = supertrend::supertrend(candles, SUPERTREND_PERIOD, SUPERTREND_MULT);

    let close_minus_vwap: Vec<Option<f64>> = closes
        .iter()
        .zip(&vwap)
        .map(|(close, v)| v.map(|v| close - v))
        .collect();
    let vwap_z = series::zscore(&close_minus_vwap, VWAP_Z_WINDOW);

    Ok(candles
        .iter()
        .enumerate()
        .map(|(i, &candle)| EnrichedCandle {
            candle,
            ema9: ema9[i],
            ema21: ema21[i],
            rsi14: rsi14[i],
            vwap: vwap[i],
            atr14: atr14[i],
            bb_mid: bb_mid[i],
            bb_up: bb_up[i],
            bb_lo: bb_lo[i],
            supertrend: st[i],
            vwap_z: vwap_z[i],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 100.0 + ((i % 9) as f64) * 0.5 + i as f64 * 0.05;
                Candle {
                    ts: Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                    open: close - 0.1,
                    high: close + 0.4,
                    low: close - 0.4,
                    close,
                    volume: 50.0 + (i % 5) as f64,
                }
            })
            .collect()
    }

    #[test]
    fn test_enrich_rejects_malformed_input() {
        assert_eq!(enrich(&[]), Err(CandleError::Empty));

        let mut bad = candles(10);
        bad[5].ts = bad[4].ts;
        assert_eq!(enrich(&bad), Err(CandleError::OutOfOrder(5)));
    }

    #[test]
    fn test_enrich_warmup_then_defined() {
        let rows = enrich(&candles(120)).unwrap();
        assert_eq!(rows.len(), 120);

        // Leading rows are warm-up, not errors
        assert!(rows[0].rsi14.is_none());
        assert!(rows[0].bb_mid.is_none());
        assert!(rows[48].vwap_z.is_none());

        let last = rows.last().unwrap();
        assert!(last.rsi14.is_some());
        assert!(last.atr14.is_some());
        assert!(last.bb_up.is_some());
        assert!(last.supertrend.is_some());
        assert!(last.vwap_z.is_some());
    }

    #[test]
    fn test_enrich_does_not_mutate_source_columns() {
        let input = candles(120);
        let rows = enrich(&input).unwrap();
        for (orig, row) in input.iter().zip(&rows) {
            assert_eq!(*orig, row.candle);
        }

        // Idempotence: enriching the carried-through candles again yields
        // identical OHLCV and indicator columns.
        let inner: Vec<Candle> = rows.iter().map(|r| r.candle).collect();
        let again = enrich(&inner).unwrap();
        assert_eq!(rows, again);
    }
}
