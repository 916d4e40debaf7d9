//! Coinbase Exchange REST candles
//!
//! Legacy products candles endpoint; rows arrive newest-first as
//! `[time, low, high, open, close, volume]`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::header::USER_AGENT;
use std::time::Duration;

use crate::data::CandleSource;
use crate::types::{Candle, Symbol};

const COINBASE_API_URL: &str = "https://api.exchange.coinbase.com";
/// One-minute buckets
const GRANULARITY_SECS: u32 = 60;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct CoinbaseCandles {
    client: reqwest::Client,
}

impl CoinbaseCandles {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for CoinbaseCandles {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandleSource for CoinbaseCandles {
    fn name(&self) -> &'static str {
        "coinbase"
    }

    async fn fetch(&self, symbol: Symbol, limit: usize) -> Result<Vec<Candle>> {
        let url = format!(
            "{COINBASE_API_URL}/products/{}/candles?granularity={GRANULARITY_SECS}",
            symbol.coinbase_product()
        );
        let rows: Vec<[f64; 6]> = self
            .client
            .get(&url)
            .header(USER_AGENT, concat!("daytrade/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("requesting Coinbase candles")?
            .error_for_status()
            .context("Coinbase candles request rejected")?
            .json()
            .await
            .context("decoding Coinbase candles")?;

        let mut candles = Vec::with_capacity(rows.len());
        for row in rows {
            let [time, low, high, open, close, volume] = row;
            let ts = Utc
                .timestamp_opt(time as i64, 0)
                .single()
                .with_context(|| format!("bad candle timestamp {time}"))?;
            candles.push(Candle {
                ts,
                open,
                high,
                low,
                close,
                volume,
            });
        }
        candles.sort_by_key(|c| c.ts);
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
        Ok(candles)
    }
}
