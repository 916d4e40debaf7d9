//! Configuration management
//!
//! Loads from an optional YAML file plus DAYTRADE_* environment variables
//! via .env, layered over built-in defaults that mirror the dashboard's
//! sidebar. The 2% daily loss limit is a fixed ledger constant, not a
//! configuration key.

use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::sizing::SizingMode;
use crate::strategy::StopModel;
use crate::types::Symbol;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Trading symbol ("BTC-USD", "ETH-USD", "SOL-USD")
    pub symbol: String,
    /// Refresh interval for the REST candle poll, seconds (1-5)
    pub refresh_secs: u64,
    pub sizing: SizingConfig,
    /// Fee rate in basis points (0-50)
    pub fees_bps: f64,
    /// Slippage rate in basis points (0-50)
    pub slippage_bps: f64,
    /// Stop model name ("ATR", "SuperTrend", "Structure", "Fixed%")
    pub stop_model: String,
    /// ATR multiple for the ATR stop model (0.5-3.0)
    pub atr_mult: f64,
    /// Attach a 1.0x ATR trailing-stop note to brackets
    pub trailing_stop: bool,
    /// Take-profit distance in percent (0.2-5.0)
    pub take_profit_pct: f64,
    /// Daily trade cap (1-100)
    pub max_trades_per_day: u32,
    /// Attach stop/take-profit brackets to placed orders
    pub attach_bracket: bool,
    /// Starting virtual cash balance (USD)
    pub starting_cash: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SizingConfig {
    /// "usd" or "risk_pct"
    pub mode: String,
    /// Notional for usd mode (USD)
    pub usd_size: f64,
    /// Risk fraction per trade in percent for risk_pct mode (0.1-5.0)
    pub risk_pct: f64,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("symbol", "BTC-USD")?
            .set_default("refresh_secs", 2)?
            .set_default("sizing.mode", "risk_pct")?
            .set_default("sizing.usd_size", 50.0)?
            .set_default("sizing.risk_pct", 1.0)?
            .set_default("fees_bps", 10.0)?
            .set_default("slippage_bps", 5.0)?
            .set_default("stop_model", "ATR")?
            .set_default("atr_mult", 1.5)?
            .set_default("trailing_stop", true)?
            .set_default("take_profit_pct", 1.0)?
            .set_default("max_trades_per_day", 20)?
            .set_default("attach_bracket", true)?
            .set_default("starting_cash", 10000.0)?
            .add_source(File::with_name("daytrade").required(false))
            .add_source(Environment::with_prefix("DAYTRADE").separator("__"))
            .build()?;

        let cfg: AppConfig = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Enforce the documented option ranges
    pub fn validate(&self) -> Result<()> {
        if Symbol::parse(&self.symbol).is_none() {
            bail!("unsupported symbol: {}", self.symbol);
        }
        if !(1..=5).contains(&self.refresh_secs) {
            bail!("refresh_secs must be 1-5, got {}", self.refresh_secs);
        }
        if !(0.0..=50.0).contains(&self.fees_bps) {
            bail!("fees_bps must be 0-50, got {}", self.fees_bps);
        }
        if !(0.0..=50.0).contains(&self.slippage_bps) {
            bail!("slippage_bps must be 0-50, got {}", self.slippage_bps);
        }
        if StopModel::parse(&self.stop_model).is_none() {
            bail!("unknown stop model: {}", self.stop_model);
        }
        if !(0.5..=3.0).contains(&self.atr_mult) {
            bail!("atr_mult must be 0.5-3.0, got {}", self.atr_mult);
        }
        if !(0.2..=5.0).contains(&self.take_profit_pct) {
            bail!(
                "take_profit_pct must be 0.2-5.0, got {}",
                self.take_profit_pct
            );
        }
        if !(1..=100).contains(&self.max_trades_per_day) {
            bail!(
                "max_trades_per_day must be 1-100, got {}",
                self.max_trades_per_day
            );
        }
        if self.starting_cash <= 0.0 {
            bail!("starting_cash must be positive, got {}", self.starting_cash);
        }
        match self.sizing.mode.as_str() {
            "usd" => {
                if self.sizing.usd_size < 10.0 {
                    bail!("sizing.usd_size must be at least 10, got {}", self.sizing.usd_size);
                }
            }
            "risk_pct" => {
                if !(0.1..=5.0).contains(&self.sizing.risk_pct) {
                    bail!(
                        "sizing.risk_pct must be 0.1-5.0, got {}",
                        self.sizing.risk_pct
                    );
                }
            }
            other => bail!("sizing.mode must be \"usd\" or \"risk_pct\", got {other}"),
        }
        Ok(())
    }

    /// Parsed symbol (validated beforehand)
    pub fn symbol(&self) -> Result<Symbol> {
        match Symbol::parse(&self.symbol) {
            Some(s) => Ok(s),
            None => bail!("unsupported symbol: {}", self.symbol),
        }
    }

    /// Sizing mode with percent converted to a fraction
    pub fn sizing_mode(&self) -> Result<SizingMode> {
        match self.sizing.mode.as_str() {
            "usd" => Ok(SizingMode::UsdAmount(self.sizing.usd_size)),
            "risk_pct" => Ok(SizingMode::RiskPct(self.sizing.risk_pct / 100.0)),
            other => bail!("sizing.mode must be \"usd\" or \"risk_pct\", got {other}"),
        }
    }

    /// Take-profit distance as a fraction
    pub fn take_profit_frac(&self) -> f64 {
        self.take_profit_pct / 100.0
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC-USD".to_string(),
            refresh_secs: 2,
            sizing: SizingConfig {
                mode: "risk_pct".to_string(),
                usd_size: 50.0,
                risk_pct: 1.0,
            },
            fees_bps: 10.0,
            slippage_bps: 5.0,
            stop_model: "ATR".to_string(),
            atr_mult: 1.5,
            trailing_stop: true,
            take_profit_pct: 1.0,
            max_trades_per_day: 20,
            attach_bracket: true,
            starting_cash: 10_000.0,
        }
    }
}
