//! Historic bar source backed by per-symbol CSV files or in-memory series.

use super::{BarSource, DataError};
use crate::domain::{Bar, Event, MarketEvent};
use crate::engine::EventQueue;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// One symbol's full history plus the portion revealed so far.
#[derive(Debug, Clone)]
struct SymbolSeries {
    full: Vec<Bar>,
    cursor: usize,
    revealed: Vec<Bar>,
}

impl SymbolSeries {
    fn new(full: Vec<Bar>) -> Self {
        let capacity = full.len();
        Self {
            full,
            cursor: 0,
            revealed: Vec::with_capacity(capacity),
        }
    }
}

/// CSV row shape: `Date,Open,High,Low,Close,Volume`, one row per trading day.
#[derive(Debug, Deserialize)]
struct CsvBar {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

/// Bar source that replays pre-loaded daily bars one step at a time.
///
/// All validation happens at load time: dates must be strictly increasing
/// per symbol and every bar must pass the OHLCV sanity check. Once loaded,
/// the replay itself cannot fail.
#[derive(Debug)]
pub struct HistoricBarSource {
    symbols: Vec<String>,
    series: HashMap<String, SymbolSeries>,
    continue_backtest: bool,
}

impl HistoricBarSource {
    /// Build a source from in-memory per-symbol bar series.
    ///
    /// The iteration order of `symbols` fixes the cross-symbol processing
    /// order for the whole run.
    pub fn from_bars(
        symbols: Vec<String>,
        mut bars_by_symbol: HashMap<String, Vec<Bar>>,
    ) -> Result<Self, DataError> {
        let mut series = HashMap::with_capacity(symbols.len());
        for symbol in &symbols {
            let bars = bars_by_symbol
                .remove(symbol)
                .ok_or_else(|| DataError::UnknownSymbol(symbol.clone()))?;
            validate_series(symbol, &bars)?;
            series.insert(symbol.clone(), SymbolSeries::new(bars));
        }
        Ok(Self {
            symbols,
            series,
            continue_backtest: true,
        })
    }

    /// Load `<SYMBOL>.csv` from `dir` for every requested symbol.
    pub fn from_csv_dir(dir: &Path, symbols: &[String]) -> Result<Self, DataError> {
        let mut bars_by_symbol = HashMap::with_capacity(symbols.len());
        for symbol in symbols {
            let path = dir.join(format!("{symbol}.csv"));
            let bars = read_symbol_csv(&path, symbol)?;
            bars_by_symbol.insert(symbol.clone(), bars);
        }
        Self::from_bars(symbols.to_vec(), bars_by_symbol)
    }

    /// Earliest bar date across all symbols, if any bars are loaded.
    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.symbols
            .iter()
            .filter_map(|s| self.series.get(s))
            .filter_map(|series| series.full.first())
            .map(|bar| bar.date)
            .min()
    }

    /// Total number of loaded bars for a symbol (revealed or not).
    pub fn series_len(&self, symbol: &str) -> Option<usize> {
        self.series.get(symbol).map(|s| s.full.len())
    }
}

impl BarSource for HistoricBarSource {
    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar], DataError> {
        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| DataError::UnknownSymbol(symbol.to_string()))?;
        let start = series.revealed.len().saturating_sub(n);
        Ok(&series.revealed[start..])
    }

    fn continue_backtest(&self) -> bool {
        self.continue_backtest
    }

    fn update_bars(&mut self, events: &mut EventQueue) -> bool {
        let mut advanced = false;
        for symbol in &self.symbols {
            let Some(series) = self.series.get_mut(symbol) else {
                continue;
            };
            match series.full.get(series.cursor) {
                Some(bar) => {
                    series.revealed.push(bar.clone());
                    series.cursor += 1;
                    advanced = true;
                }
                None => {
                    // exhaustion is the normal termination condition
                    self.continue_backtest = false;
                }
            }
        }
        if advanced {
            events.push(Event::Market(MarketEvent));
        }
        advanced
    }
}

fn validate_series(symbol: &str, bars: &[Bar]) -> Result<(), DataError> {
    let mut previous: Option<NaiveDate> = None;
    for bar in bars {
        if !bar.is_sane() {
            return Err(DataError::MalformedBar {
                symbol: symbol.to_string(),
                date: bar.date,
            });
        }
        if let Some(prev) = previous {
            if bar.date <= prev {
                return Err(DataError::OutOfOrder {
                    symbol: symbol.to_string(),
                    date: bar.date,
                });
            }
        }
        previous = Some(bar.date);
    }
    if bars.is_empty() {
        warn!(%symbol, "loaded an empty bar series");
    }
    Ok(())
}

fn read_symbol_csv(path: &Path, symbol: &str) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| DataError::Csv {
        symbol: symbol.to_string(),
        source,
    })?;
    let mut bars = Vec::new();
    for row in reader.deserialize::<CsvBar>() {
        let row = row.map_err(|source| DataError::Csv {
            symbol: symbol.to_string(),
            source,
        })?;
        bars.push(Bar {
            symbol: symbol.to_string(),
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    Ok(bars)
}
