//! Synthetic bar generation — seeded geometric random walk.
//!
//! Used by the CLI `generate` command and by integration tests that need a
//! data directory without shipping fixtures.

use chrono::NaiveDate;
use patternlab_core::domain::Bar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

/// Shape of a generated series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticConfig {
    pub start_date: NaiveDate,
    pub days: usize,
    pub initial_price: f64,
    /// Mean daily return (0.0005 is roughly +12% a year).
    pub drift: f64,
    /// Daily return standard deviation.
    pub volatility: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2022, 1, 3).expect("valid date"),
            days: 500,
            initial_price: 100.0,
            drift: 0.0005,
            volatility: 0.012,
        }
    }
}

/// Generate a daily bar series for one symbol.
///
/// Deterministic for a given seed. Closes follow a drift + noise walk with
/// a floor well above zero; highs and lows bracket the open/close range so
/// every bar passes the sanity check.
pub fn generate_bars(symbol: &str, config: &SyntheticConfig, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(config.days);
    let mut price = config.initial_price;

    for i in 0..config.days {
        let open = price;
        let daily_return = config.drift + config.volatility * standard_normal(&mut rng);
        price = (price * (1.0 + daily_return)).max(config.initial_price * 0.05);
        let close = price;

        let span = (open - close).abs().max(open * 0.001);
        let high = open.max(close) + span * rng.gen_range(0.0..0.5);
        let low = (open.min(close) - span * rng.gen_range(0.0..0.5)).max(close * 0.5);
        let volume = rng.gen_range(100_000.0..1_000_000.0_f64).round();

        bars.push(Bar {
            symbol: symbol.to_string(),
            date: config.start_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
    }
    bars
}

/// Approximate standard normal via the sum of twelve uniforms.
fn standard_normal(rng: &mut StdRng) -> f64 {
    (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0
}

/// Write `<SYMBOL>.csv` into `dir` in the bar-source format.
pub fn write_symbol_csv(dir: &Path, symbol: &str, bars: &[Bar]) -> csv::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{symbol}.csv"));
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["Date", "Open", "High", "Low", "Close", "Volume"])?;
    for bar in bars {
        writer.write_record([
            bar.date.to_string(),
            format!("{:.4}", bar.open),
            format!("{:.4}", bar.high),
            format!("{:.4}", bar.low),
            format!("{:.4}", bar.close),
            format!("{:.0}", bar.volume),
        ])?;
    }
    writer.flush()?;
    Ok(path)
}
