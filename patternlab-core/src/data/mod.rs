//! Bar sources — ordered OHLCV history revealed one step at a time.
//!
//! A bar source replicates how a live feed would behave: bars arrive in date
//! order, one per symbol per step, and consumers can only see what has been
//! revealed so far. Historic and live systems are treated identically by the
//! rest of the engine.

mod historic;

pub use historic::HistoricBarSource;

use crate::domain::Bar;
use crate::engine::EventQueue;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for bar data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("no bars revealed yet for symbol '{0}'")]
    EmptySeries(String),

    #[error("csv error for '{symbol}': {source}")]
    Csv {
        symbol: String,
        #[source]
        source: csv::Error,
    },

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bars for '{symbol}' are not strictly date-ordered at {date}")]
    OutOfOrder { symbol: String, date: NaiveDate },

    #[error("malformed OHLCV bar for '{symbol}' at {date}")]
    MalformedBar { symbol: String, date: NaiveDate },
}

/// Abstract bar-producing source.
///
/// Implementations own the full history; the engine only sees bars that have
/// been revealed by `update_bars`. This is the seam where a live feed would
/// replace the historic CSV reader.
pub trait BarSource {
    /// Symbols served by this source, in fixed iteration order.
    fn symbols(&self) -> &[String];

    /// Up to `n` most recently revealed bars for `symbol`, oldest first.
    ///
    /// Returns fewer than `n` bars early in the run. Requesting an unknown
    /// symbol is an error; callers treat it as "no signal this bar."
    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar], DataError>;

    /// Whether another step of data may be available.
    ///
    /// Flips to `false` once any symbol's series is exhausted; the simulation
    /// loop observes this to stop advancing.
    fn continue_backtest(&self) -> bool;

    /// Reveal the next bar for every symbol.
    ///
    /// Pushes exactly one `MarketEvent` and returns true when at least one
    /// symbol advanced. A symbol with no bars left flips the continue flag
    /// instead.
    fn update_bars(&mut self, events: &mut EventQueue) -> bool;
}
