//! Rolling and exponential series transforms
//!
//! Stateless transforms over a time-ordered slice: EMA, RSI, true range /
//! ATR, cumulative VWAP, Bollinger Bands, rolling z-score and centered
//! swing-point detection.
//!
//! Warm-up cells are `None`, never NaN: a consumer must read `None` as
//! "insufficient history", not as a zero-magnitude value. All windows are
//! right-aligned except swing-point detection, which is centered and
//! therefore confirms a point only `lookback / 2` steps after the fact.

use crate::types::Candle;

/// Guard added to the RSI denominator so a loss-free window divides cleanly
const RSI_EPS: f64 = 1e-12;

/// Exponential moving average with alpha = 2 / (span + 1), seeded by the
/// first value. One output per input, defined from the first row.
pub fn ema(series: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    let mut prev = match series.first() {
        Some(&v) => v,
        None => return out,
    };
    out.push(prev);
    for &v in &series[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Relative strength index over a simple rolling mean of up/down deltas.
/// The first `length` values are undefined; output is bounded in [0, 100].
pub fn rsi(series: &[f64], length: usize) -> Vec<Option<f64>> {
    let n = series.len();
    let mut out = vec![None; n];
    if n < 2 || length == 0 {
        return out;
    }
    let mut up_sum = 0.0;
    let mut down_sum = 0.0;
    for i in 1..n {
        let delta = series[i] - series[i - 1];
        up_sum += delta.max(0.0);
        down_sum += (-delta).max(0.0);
        if i > length {
            let old = series[i - length] - series[i - length - 1];
            up_sum -= old.max(0.0);
            down_sum -= (-old).max(0.0);
        }
        if i >= length {
            let rs = (up_sum / length as f64) / (down_sum / length as f64 + RSI_EPS);
            out[i] = Some(100.0 - 100.0 / (1.0 + rs));
        }
    }
    out
}

/// True range per row: max(high - low, |high - prev_close|, |low - prev_close|).
/// The first row has no previous close and falls back to high - low.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let hl = c.high - c.low;
            if i == 0 {
                hl
            } else {
                let pc = candles[i - 1].close;
                hl.max((c.high - pc).abs()).max((c.low - pc).abs())
            }
        })
        .collect()
}

/// Average true range: simple rolling mean of true range over `length` rows
pub fn atr(candles: &[Candle], length: usize) -> Vec<Option<f64>> {
    rolling_mean(&true_range(candles), length)
}

/// Cumulative session-to-date VWAP. Undefined while cumulative volume is zero.
pub fn vwap(candles: &[Candle]) -> Vec<Option<f64>> {
    let mut pv = 0.0;
    let mut vv = 0.0;
    candles
        .iter()
        .map(|c| {
            pv += c.close * c.volume;
            vv += c.volume;
            if vv > 0.0 {
                Some(pv / vv)
            } else {
                None
            }
        })
        .collect()
}

/// Bollinger bands: (middle, upper, lower) with the middle a rolling mean
/// and the bands `mult` population standard deviations away.
#[allow(clippy::type_complexity)]
pub fn bollinger_bands(
    series: &[f64],
    length: usize,
    mult: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let stats = rolling_mean_std(series, length);
    let mut mid = Vec::with_capacity(series.len());
    let mut up = Vec::with_capacity(series.len());
    let mut lo = Vec::with_capacity(series.len());
    for cell in stats {
        match cell {
            Some((mean, std)) => {
                mid.push(Some(mean));
                up.push(Some(mean + mult * std));
                lo.push(Some(mean - mult * std));
            }
            None => {
                mid.push(None);
                up.push(None);
                lo.push(None);
            }
        }
    }
    (mid, up, lo)
}

/// Rolling z-score: (value - mean) / population stddev over `window`.
/// Undefined while the window is short, contains an undefined cell, or has
/// zero deviation.
pub fn zscore(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = series.len();
    let mut out = vec![None; n];
    if window == 0 {
        return out;
    }
    let mut sum = 0.0;
    let mut sumsq = 0.0;
    let mut defined = 0usize;
    for i in 0..n {
        if let Some(v) = series[i] {
            sum += v;
            sumsq += v * v;
            defined += 1;
        }
        if i >= window {
            if let Some(old) = series[i - window] {
                sum -= old;
                sumsq -= old * old;
                defined -= 1;
            }
        }
        if i + 1 >= window && defined == window {
            let mean = sum / window as f64;
            let var = (sumsq / window as f64 - mean * mean).max(0.0);
            let std = var.sqrt();
            if std > 0.0 {
                // defined == window guarantees the current cell is Some
                out[i] = series[i].map(|v| (v - mean) / std);
            }
        }
    }
    out
}

/// A confirmed swing extremum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPoint {
    /// Row index of the extremum
    pub index: usize,
    /// Series value at that row
    pub value: f64,
}

/// Detect swing points over a centered window of width `lookback`: a row is
/// a swing high/low iff it is the first occurrence of the window maximum /
/// minimum at the window center. Returns the most recent confirmed
/// (high, low), scanning backward from the end; `(None, None)` while the
/// series is shorter than `lookback`.
pub fn swing_points(
    series: &[f64],
    lookback: usize,
) -> (Option<SwingPoint>, Option<SwingPoint>) {
    let n = series.len();
    if lookback == 0 || n < lookback {
        return (None, None);
    }
    let half = lookback / 2;
    let mut high = None;
    let mut low = None;
    // Valid centers run from `half` to n - (lookback - half), inclusive
    let last_center = n - (lookback - half);
    for center in (half..=last_center).rev() {
        let win = &series[center - half..center - half + lookback];
        if high.is_none() && argmax(win) == half {
            high = Some(SwingPoint {
                index: center,
                value: series[center],
            });
        }
        if low.is_none() && argmin(win) == half {
            low = Some(SwingPoint {
                index: center,
                value: series[center],
            });
        }
        if high.is_some() && low.is_some() {
            break;
        }
    }
    (high, low)
}

/// Simple rolling mean, defined once the window is full
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = series.len();
    let mut out = vec![None; n];
    if window == 0 {
        return out;
    }
    let mut sum = 0.0;
    for i in 0..n {
        sum += series[i];
        if i >= window {
            sum -= series[i - window];
        }
        if i + 1 >= window {
            out[i] = Some(sum / window as f64);
        }
    }
    out
}

/// Rolling (mean, population stddev) via running sum-of-squares
fn rolling_mean_std(series: &[f64], window: usize) -> Vec<Option<(f64, f64)>> {
    let n = series.len();
    let mut out = vec![None; n];
    if window == 0 {
        return out;
    }
    let mut sum = 0.0;
    let mut sumsq = 0.0;
    for i in 0..n {
        sum += series[i];
        sumsq += series[i] * series[i];
        if i >= window {
            sum -= series[i - window];
            sumsq -= series[i - window] * series[i - window];
        }
        if i + 1 >= window {
            let mean = sum / window as f64;
            let var = (sumsq / window as f64 - mean * mean).max(0.0);
            out[i] = Some((mean, var.sqrt()));
        }
    }
    out
}

fn argmax(win: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in win.iter().enumerate() {
        if v > win[best] {
            best = i;
        }
    }
    best
}

fn argmin(win: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in win.iter().enumerate() {
        if v < win[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                ts: Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 100.0,
            })
            .collect()
    }

    #[test]
    fn test_ema_constant_series_stays_constant() {
        let series = vec![42.0; 30];
        let out = ema(&series, 9);
        assert_eq!(out.len(), 30);
        for v in out {
            assert!((v - 42.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ema_seeded_by_first_value() {
        let out = ema(&[10.0, 20.0], 9);
        assert_eq!(out[0], 10.0);
        // alpha = 0.2 -> 0.2 * 20 + 0.8 * 10
        assert!((out[1] - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_warmup_and_bounds() {
        let series: Vec<f64> = (0..40).map(|i| 100.0 + (i % 7) as f64).collect();
        let out = rsi(&series, 14);
        for cell in &out[..14] {
            assert!(cell.is_none());
        }
        for cell in out.iter().flatten() {
            assert!(*cell >= 0.0 && *cell <= 100.0);
        }
    }

    #[test]
    fn test_rsi_monotonic_limits() {
        let rising: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&rising, 14);
        assert!(out[39].unwrap() > 99.9);

        let falling: Vec<f64> = (0..40).map(|i| 100.0 - i as f64).collect();
        let out = rsi(&falling, 14);
        assert!(out[39].unwrap() < 0.1);
    }

    #[test]
    fn test_true_range_uses_prev_close_gap() {
        let mut candles = candles_from_closes(&[100.0, 100.0]);
        // Gap up: prev close 100, today's low 110
        candles[1].low = 110.0;
        candles[1].high = 112.0;
        candles[1].close = 111.0;
        let tr = true_range(&candles);
        assert_eq!(tr[0], 2.0);
        assert_eq!(tr[1], 12.0); // high - prev_close dominates
    }

    #[test]
    fn test_atr_constant_range() {
        let candles = candles_from_closes(&[100.0; 20]);
        let out = atr(&candles, 14);
        assert!(out[12].is_none());
        assert!((out[13].unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_vwap_undefined_until_volume() {
        let mut candles = candles_from_closes(&[100.0, 102.0, 104.0]);
        candles[0].volume = 0.0;
        let out = vwap(&candles);
        assert!(out[0].is_none());
        assert!((out[1].unwrap() - 102.0).abs() < 1e-12);
        assert!((out[2].unwrap() - 103.0).abs() < 1e-12);
    }

    #[test]
    fn test_bollinger_bands_symmetric() {
        let series: Vec<f64> = (0..30).map(|i| 100.0 + (i % 4) as f64).collect();
        let (mid, up, lo) = bollinger_bands(&series, 20, 2.0);
        assert!(mid[18].is_none());
        let (m, u, l) = (mid[25].unwrap(), up[25].unwrap(), lo[25].unwrap());
        assert!((u - m - (m - l)).abs() < 1e-9);
        assert!(u > m && m > l);
    }

    #[test]
    fn test_zscore_zero_deviation_is_undefined() {
        let series: Vec<Option<f64>> = vec![Some(5.0); 20];
        let out = zscore(&series, 10);
        assert!(out.iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_zscore_simple_window() {
        let series: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        let out = zscore(&series, 5);
        assert!(out[3].is_none());
        // Window 0..=4: mean 2, population std sqrt(2)
        let z = out[4].unwrap();
        assert!((z - 2.0 / 2.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_zscore_skips_undefined_cells() {
        let mut series: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        series[6] = None;
        let out = zscore(&series, 5);
        // Windows covering index 6 are undefined again
        for i in 6..=9 {
            assert!(out[i].is_none(), "index {i} should be undefined");
        }
        assert!(out[5].is_some());
    }

    #[test]
    fn test_swing_points_peak_and_trough() {
        let series = vec![1.0, 2.0, 5.0, 2.0, 1.0, 0.5, 0.2, 0.8, 1.5, 1.6, 1.7];
        let (high, low) = swing_points(&series, 5);
        let high = high.unwrap();
        assert_eq!(high.index, 2);
        assert_eq!(high.value, 5.0);
        let low = low.unwrap();
        assert_eq!(low.index, 6);
        assert_eq!(low.value, 0.2);
    }

    #[test]
    fn test_swing_points_short_series() {
        assert_eq!(swing_points(&[1.0, 2.0, 3.0], 5), (None, None));
    }

    #[test]
    fn test_swing_points_flat_series_has_no_swings() {
        // First-occurrence argmax of a flat window is the left edge, not the
        // center, so a flat series never confirms a swing.
        let (high, low) = swing_points(&[3.0; 12], 5);
        assert!(high.is_none());
        assert!(low.is_none());
    }
}
