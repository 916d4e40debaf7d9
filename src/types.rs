//! Core types used throughout the assistant
//!
//! Defines candles, trade sides, signal directions and the candle-sequence
//! validation the indicator pipeline relies on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Supported trading symbols (USD quoted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    BtcUsd,
    EthUsd,
    SolUsd,
}

impl Default for Symbol {
    fn default() -> Self {
        Symbol::BtcUsd
    }
}

impl Symbol {
    /// Product id for the Coinbase Exchange REST API (e.g. "BTC-USD")
    pub fn coinbase_product(&self) -> &'static str {
        match self {
            Symbol::BtcUsd => "BTC-USD",
            Symbol::EthUsd => "ETH-USD",
            Symbol::SolUsd => "SOL-USD",
        }
    }

    /// Pair name for the Kraken public OHLC API (dash stripped)
    pub fn kraken_pair(&self) -> &'static str {
        match self {
            Symbol::BtcUsd => "BTCUSD",
            Symbol::EthUsd => "ETHUSD",
            Symbol::SolUsd => "SOLUSD",
        }
    }

    /// Parse from a display string ("BTC-USD" or bare "BTC")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BTC-USD" | "BTC" => Some(Symbol::BtcUsd),
            "ETH-USD" | "ETH" => Some(Symbol::EthUsd),
            "SOL-USD" | "SOL" => Some(Symbol::SolUsd),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.coinbase_product())
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for Buy, -1 for Sell
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Directional trading signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
            Direction::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// One OHLCV time step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time
    pub ts: DateTime<Utc>,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume in base currency
    pub volume: f64,
}

/// Malformed candle-sequence errors, raised before any indicator math runs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CandleError {
    #[error("candle sequence is empty")]
    Empty,
    #[error("timestamps not strictly increasing at index {0}")]
    OutOfOrder(usize),
    #[error("non-positive or non-finite price at index {0}")]
    BadPrice(usize),
    #[error("negative or non-finite volume at index {0}")]
    BadVolume(usize),
}

/// Validate a candle sequence: non-empty, strictly increasing timestamps,
/// positive finite prices, non-negative finite volume.
pub fn validate_candles(candles: &[Candle]) -> Result<(), CandleError> {
    if candles.is_empty() {
        return Err(CandleError::Empty);
    }
    for (i, c) in candles.iter().enumerate() {
        let prices = [c.open, c.high, c.low, c.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(CandleError::BadPrice(i));
        }
        if !c.volume.is_finite() || c.volume < 0.0 {
            return Err(CandleError::BadVolume(i));
        }
        if i > 0 && candles[i - 1].ts >= c.ts {
            return Err(CandleError::OutOfOrder(i));
        }
    }
    Ok(())
}
