//! Daytrade - paper-mode day-trading assistant
//!
//! Refresh loop: fetch candles, enrich with indicators, derive the signal,
//! stop and sizing estimate, and log what the dashboard would display. The
//! ledger is constructed here and owned by the loop; placing and closing
//! paper orders is left to the consumer driving it.

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use daytrade::config::AppConfig;
use daytrade::data::get_candles;
use daytrade::format::{format_pct, format_usd};
use daytrade::indicators::enrich;
use daytrade::paper_trading::{Bracket, PaperLedger};
use daytrade::sizing::{default_side, position_qty};
use daytrade::strategy::{generate_signal, stop_for};

/// Candle history to request per refresh
const CANDLE_LIMIT: usize = 600;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = AppConfig::load()?;
    let symbol = cfg.symbol()?;
    let sizing_mode = cfg.sizing_mode()?;

    let mut ledger = PaperLedger::new(cfg.starting_cash);
    ledger.set_max_trades_per_day(cfg.max_trades_per_day);

    info!(%symbol, stop_model = %cfg.stop_model, refresh_secs = cfg.refresh_secs, "starting paper assistant");

    let mut ticker = interval(Duration::from_secs(cfg.refresh_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }

        let (candles, provenance) = get_candles(symbol, CANDLE_LIMIT).await;
        let rows = match enrich(&candles) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "skipping refresh on malformed candles");
                continue;
            }
        };

        let signal = generate_signal(&rows);
        let last = match rows.last() {
            Some(last) => last,
            None => continue,
        };
        let last_price = last.close();
        let change_1m = rows
            .len()
            .checked_sub(2)
            .map(|i| last_price / rows[i].close() - 1.0);

        let side = default_side(signal.direction);
        let stop = stop_for(&cfg.stop_model, &rows, side, cfg.atr_mult);
        let take_profit = last_price * (1.0 + side.sign() * cfg.take_profit_frac());
        let qty = position_qty(sizing_mode, last_price, stop, ledger.cash());
        let bracket = if cfg.attach_bracket {
            Bracket {
                stop,
                take_profit: Some(take_profit),
                trailing_atr_mult: cfg.trailing_stop.then_some(1.0),
            }
        } else {
            Bracket::default()
        };

        info!(
            source = %provenance,
            price = %format_usd(Some(last_price)),
            change_1m = %format_pct(change_1m),
            vwap = %format_usd(last.vwap),
            signal = %signal.direction,
            score = signal.score,
            rationale = %signal.rationale,
            "refresh"
        );
        info!(
            %side,
            qty = %format!("{qty:.6}"),
            stop = %format_usd(bracket.stop.or(stop)),
            take_profit = %format_usd(bracket.take_profit.or(Some(take_profit))),
            trailing = bracket.trailing_atr_mult.is_some(),
            cash = %format_usd(Some(ledger.cash())),
            realized_pnl = %format_usd(Some(ledger.realized_pnl())),
            open_orders = ledger.orders().len(),
            "projection"
        );
    }

    Ok(())
}
