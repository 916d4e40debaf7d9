//! Offline random-walk candle generator
//!
//! Last-resort source when every exchange is unreachable: a Gaussian
//! random walk around 100 with one-minute spacing ending now. Output
//! always satisfies `validate_candles`.

use chrono::{Duration, DurationRound, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::types::Candle;

const START_PRICE: f64 = 100.0;
const STEP_SIGMA: f64 = 0.2;
/// High/low wick offset bound
const WICK_RANGE: f64 = 0.15;
/// Open jitter bound
const OPEN_JITTER: f64 = 0.05;

/// Generate `limit` one-minute candles, oldest first
pub fn synthetic_candles(limit: usize) -> Vec<Candle> {
    let mut rng = rand::thread_rng();
    let step = Normal::new(0.0, STEP_SIGMA).unwrap();

    let end = Utc::now()
        .duration_trunc(Duration::minutes(1))
        .unwrap_or_else(|_| Utc::now());
    let mut price = START_PRICE;
    let mut candles = Vec::with_capacity(limit);

    for i in 0..limit {
        price = (price + step.sample(&mut rng)).max(1.0);
        let high = price + rng.gen_range(0.0..WICK_RANGE);
        let low = price - rng.gen_range(0.0..WICK_RANGE);
        let open = price + rng.gen_range(-OPEN_JITTER..OPEN_JITTER);
        candles.push(Candle {
            ts: end - Duration::minutes((limit - 1 - i) as i64),
            open,
            high,
            low,
            close: price,
            volume: rng.gen_range(10.0..100.0),
        });
    }
    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::validate_candles;

    #[test]
    fn test_synthetic_candles_are_valid() {
        let candles = synthetic_candles(120);
        assert_eq!(candles.len(), 120);
        assert!(validate_candles(&candles).is_ok());
    }

    #[test]
    fn test_synthetic_candles_one_minute_spacing() {
        let candles = synthetic_candles(10);
        for w in candles.windows(2) {
            assert_eq!((w[1].ts - w[0].ts).num_seconds(), 60);
        }
    }
}
