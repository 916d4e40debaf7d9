//! Candle retrieval with exchange fallback
//!
//! The core is agnostic to candle provenance; this module produces its
//! input. Sources are tried in order — Coinbase, then Kraken, then an
//! offline random-walk generator — and every fetched sequence is validated
//! before it is handed to the indicator pipeline. A source returning a
//! malformed payload counts as a failure and falls through to the next.

mod coinbase;
mod kraken;
mod synthetic;

pub use coinbase::CoinbaseCandles;
pub use kraken::KrakenCandles;
pub use synthetic::synthetic_candles;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use tracing::{info, warn};

use crate::types::{validate_candles, Candle, Symbol};

/// Trait for REST candle sources
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch up to `limit` one-minute candles, oldest first
    async fn fetch(&self, symbol: Symbol, limit: usize) -> Result<Vec<Candle>>;
}

/// Where a candle sequence actually came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleProvenance {
    Coinbase,
    Kraken,
    Synthetic,
}

impl fmt::Display for CandleProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandleProvenance::Coinbase => write!(f, "coinbase"),
            CandleProvenance::Kraken => write!(f, "kraken"),
            CandleProvenance::Synthetic => write!(f, "simulated"),
        }
    }
}

/// Fetch candles for `symbol`, falling back across sources and finally to
/// the synthetic generator, which cannot fail.
pub async fn get_candles(symbol: Symbol, limit: usize) -> (Vec<Candle>, CandleProvenance) {
    let coinbase = CoinbaseCandles::new();
    match fetch_validated(&coinbase, symbol, limit).await {
        Ok(candles) => return (candles, CandleProvenance::Coinbase),
        Err(e) => warn!(source = coinbase.name(), error = %e, "candle fetch failed"),
    }

    let kraken = KrakenCandles::new();
    match fetch_validated(&kraken, symbol, limit).await {
        Ok(candles) => return (candles, CandleProvenance::Kraken),
        Err(e) => warn!(source = kraken.name(), error = %e, "candle fetch failed"),
    }

    info!(%symbol, limit, "all live sources failed, generating synthetic candles");
    (synthetic_candles(limit), CandleProvenance::Synthetic)
}

async fn fetch_validated(
    source: &dyn CandleSource,
    symbol: Symbol,
    limit: usize,
) -> Result<Vec<Candle>> {
    let candles = source.fetch(symbol, limit).await?;
    validate_candles(&candles)
        .with_context(|| format!("{} returned a malformed candle sequence", source.name()))?;
    Ok(candles)
}
