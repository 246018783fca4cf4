//! Single-backtest orchestration: discover symbols, wire the components,
//! run the simulation, and summarize the result.

use crate::config::{BacktestConfig, RunId, StrategyChoice};
use crate::metrics::SummaryStats;
use patternlab_core::domain::HoldingsSnapshot;
use patternlab_core::{
    BuyAndHoldStrategy, DataError, DoubleTopConfig, DoubleTopStrategy, HistoricBarSource,
    NaivePortfolio, SimulatedExecutionHandler, Simulation, SimulationError, SimulationReport,
    Strategy,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Result of a completed backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub run_id: RunId,
    pub strategy: String,
    pub symbols: Vec<String>,
    pub initial_capital: f64,
    pub final_total: f64,
    pub stats: SummaryStats,
    /// Dispatch accounting from the simulation loop.
    pub simulation: SimulationReport,
    /// Equity curve source: the full append-only holdings history.
    pub holdings: Vec<HoldingsSnapshot>,
    /// Double-top bookkeeping; zero for strategies without a detector.
    pub patterns_detected: usize,
    pub patterns_confirmed: usize,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("no csv bar files found in {0}")]
    NoSymbols(PathBuf),

    #[error("cannot list data directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Discover symbols from `*.csv` files in a directory, sorted by name.
pub fn discover_symbols(dir: &Path) -> Result<Vec<String>, RunError> {
    let entries = std::fs::read_dir(dir).map_err(|source| RunError::ListDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut symbols = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| RunError::ListDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "csv") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }
    }
    symbols.sort();
    Ok(symbols)
}

/// Run a single backtest described by `config`.
pub fn run_backtest(config: &BacktestConfig) -> Result<BacktestReport, RunError> {
    let symbols = if config.symbols.is_empty() {
        discover_symbols(&config.data_dir)?
    } else {
        config.symbols.clone()
    };
    if symbols.is_empty() {
        return Err(RunError::NoSymbols(config.data_dir.clone()));
    }

    info!(run_id = %config.run_id(), strategy = config.strategy.name(), symbols = symbols.len(), "starting backtest");

    let data = HistoricBarSource::from_csv_dir(&config.data_dir, &symbols)?;
    let start_date = config
        .start_date
        .or_else(|| data.earliest_date())
        .unwrap_or_default();
    let portfolio = NaivePortfolio::new(symbols.clone(), start_date, config.initial_capital);
    let execution = SimulatedExecutionHandler::new(config.commission);

    match &config.strategy {
        StrategyChoice::BuyAndHold => {
            let strategy = BuyAndHoldStrategy::new(symbols.clone());
            let (report, _strategy) =
                run_simulation(config, symbols, data, strategy, portfolio, execution)?;
            Ok(report)
        }
        StrategyChoice::DoubleTop { extrema, scan } => {
            let strategy = DoubleTopStrategy::new(
                symbols.clone(),
                DoubleTopConfig {
                    extrema: *extrema,
                    scan: *scan,
                },
            );
            let (mut report, strategy) =
                run_simulation(config, symbols, data, strategy, portfolio, execution)?;
            report.patterns_detected = strategy.detected_count();
            report.patterns_confirmed = strategy.confirmed_count();
            Ok(report)
        }
    }
}

fn run_simulation<S: Strategy>(
    config: &BacktestConfig,
    symbols: Vec<String>,
    data: HistoricBarSource,
    strategy: S,
    portfolio: NaivePortfolio,
    execution: SimulatedExecutionHandler,
) -> Result<(BacktestReport, S), RunError> {
    let mut sim = Simulation::new(data, strategy, portfolio, execution);
    sim.run()?;
    let (_data, strategy, portfolio, _execution, simulation) = sim.into_parts();

    let holdings = portfolio.holdings_history().to_vec();
    let stats = SummaryStats::compute(&holdings);
    let final_total = holdings.last().map(|h| h.total).unwrap_or(0.0);

    info!(
        bars = simulation.market_events,
        fills = simulation.fill_events,
        final_total,
        "backtest complete"
    );

    Ok((
        BacktestReport {
            run_id: config.run_id(),
            strategy: strategy.name().to_string(),
            symbols,
            initial_capital: config.initial_capital,
            final_total,
            stats,
            simulation,
            holdings,
            patterns_detected: 0,
            patterns_confirmed: 0,
        },
        strategy,
    ))
}
