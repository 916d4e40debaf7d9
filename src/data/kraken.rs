//! Kraken public OHLC REST candles
//!
//! Rows are `[time, open, high, low, close, vwap, volume, count]` with the
//! numeric fields encoded as strings, keyed under an exchange-internal pair
//! name alongside a `last` cursor.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::data::CandleSource;
use crate::types::{Candle, Symbol};

const KRAKEN_API_URL: &str = "https://api.kraken.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct KrakenResponse {
    error: Vec<String>,
    result: Option<HashMap<String, Value>>,
}

pub struct KrakenCandles {
    client: reqwest::Client,
}

impl KrakenCandles {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for KrakenCandles {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandleSource for KrakenCandles {
    fn name(&self) -> &'static str {
        "kraken"
    }

    async fn fetch(&self, symbol: Symbol, limit: usize) -> Result<Vec<Candle>> {
        let url = format!(
            "{KRAKEN_API_URL}/0/public/OHLC?pair={}&interval=1",
            symbol.kraken_pair()
        );
        let resp: KrakenResponse = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("requesting Kraken OHLC")?
            .error_for_status()
            .context("Kraken OHLC request rejected")?
            .json()
            .await
            .context("decoding Kraken OHLC")?;

        if !resp.error.is_empty() {
            bail!("Kraken error: {}", resp.error.join(", "));
        }
        let result = resp.result.context("Kraken response missing result")?;
        let rows = result
            .iter()
            .find(|(key, _)| key.as_str() != "last")
            .map(|(_, v)| v)
            .context("no OHLC series in Kraken response")?
            .as_array()
            .context("Kraken OHLC series is not an array")?;

        let start = rows.len().saturating_sub(limit);
        let mut candles = Vec::with_capacity(rows.len() - start);
        for row in &rows[start..] {
            let row = row.as_array().context("Kraken OHLC row is not an array")?;
            if row.len() < 7 {
                bail!("Kraken OHLC row too short: {} fields", row.len());
            }
            let time = field_f64(&row[0])? as i64;
            let ts = Utc
                .timestamp_opt(time, 0)
                .single()
                .with_context(|| format!("bad candle timestamp {time}"))?;
            candles.push(Candle {
                ts,
                open: field_f64(&row[1])?,
                high: field_f64(&row[2])?,
                low: field_f64(&row[3])?,
                close: field_f64(&row[4])?,
                volume: field_f64(&row[6])?,
            });
        }
        Ok(candles)
    }
}

/// Kraken mixes raw numbers and stringified decimals in the same row
fn field_f64(v: &Value) -> Result<f64> {
    if let Some(n) = v.as_f64() {
        return Ok(n);
    }
    v.as_str()
        .context("field is neither number nor string")?
        .parse::<f64>()
        .context("field does not parse as a number")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_f64_accepts_both_encodings() {
        assert_eq!(field_f64(&Value::from(42)).unwrap(), 42.0);
        assert_eq!(field_f64(&Value::from("97000.1")).unwrap(), 97000.1);
        assert!(field_f64(&Value::Null).is_err());
    }
}
