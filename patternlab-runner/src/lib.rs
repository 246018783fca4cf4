//! Patternlab Runner — backtest orchestration and reporting.
//!
//! This crate builds on `patternlab-core` to provide:
//! - Serializable run configuration with content-addressable run IDs
//! - Symbol discovery over a directory of CSV bar files
//! - The single-backtest runner producing a summary report
//! - Performance metrics (returns, equity curve, Sharpe, drawdown)
//! - Synthetic bar generation for demos and tests

pub mod config;
pub mod metrics;
pub mod runner;
pub mod synthetic;

pub use config::{BacktestConfig, ConfigError, RunId, StrategyChoice};
pub use metrics::{equity_curve, max_drawdown, period_returns, sharpe_ratio, SummaryStats};
pub use runner::{discover_symbols, run_backtest, BacktestReport, RunError};
pub use synthetic::{generate_bars, write_symbol_csv, SyntheticConfig};
