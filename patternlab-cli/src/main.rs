//! Patternlab CLI — run backtests and generate synthetic bar data.
//!
//! Commands:
//! - `run` — execute a backtest over a directory of per-symbol CSV bars,
//!   from flags or a TOML config file
//! - `generate` — write seeded synthetic CSV bar files for quick demos

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use patternlab_runner::{
    generate_bars, run_backtest, write_symbol_csv, BacktestConfig, BacktestReport, StrategyChoice,
    SyntheticConfig,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "patternlab",
    about = "Patternlab CLI — event-driven backtesting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest over a directory of per-symbol CSV bars.
    Run {
        /// Path to a TOML config file; flags below are ignored if set.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory of `<SYMBOL>.csv` bar files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Symbols to simulate. Defaults to every CSV file in the directory.
        #[arg(long)]
        symbols: Vec<String>,

        /// Strategy: buy-and-hold or double-top.
        #[arg(long, default_value = "buy-and-hold")]
        strategy: String,

        /// Initial capital.
        #[arg(long, default_value_t = 100_000.0)]
        capital: f64,

        /// Fixed commission per fill.
        #[arg(long, default_value_t = 1.0)]
        commission: f64,

        /// Ledger start date (YYYY-MM-DD). Defaults to the earliest bar.
        #[arg(long)]
        start: Option<String>,

        /// Write the full report as JSON to this path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate synthetic daily bars as CSV files.
    Generate {
        /// Symbols to generate (e.g., ABC XYZ).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Output directory.
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,

        /// Number of daily bars per symbol.
        #[arg(long, default_value_t = 500)]
        days: usize,

        /// Base RNG seed; symbol index is added per file.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            data_dir,
            symbols,
            strategy,
            capital,
            commission,
            start,
            output,
        } => run_cmd(
            config, data_dir, symbols, strategy, capital, commission, start, output,
        ),
        Commands::Generate {
            symbols,
            out_dir,
            days,
            seed,
        } => generate_cmd(symbols, out_dir, days, seed),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_cmd(
    config_path: Option<PathBuf>,
    data_dir: PathBuf,
    symbols: Vec<String>,
    strategy: String,
    capital: f64,
    commission: f64,
    start: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => BacktestConfig::from_toml_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            let strategy = parse_strategy(&strategy)?;
            let mut config = BacktestConfig::new(data_dir, strategy);
            config.symbols = symbols;
            config.initial_capital = capital;
            config.commission = commission;
            config.start_date = start
                .map(|s| {
                    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                        .with_context(|| format!("invalid start date '{s}'"))
                })
                .transpose()?;
            config
        }
    };

    let report = run_backtest(&config).context("backtest failed")?;
    print_report(&report);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
        println!("\nReport written to {}", path.display());
    }
    Ok(())
}

fn generate_cmd(symbols: Vec<String>, out_dir: PathBuf, days: usize, seed: u64) -> Result<()> {
    let config = SyntheticConfig {
        days,
        ..SyntheticConfig::default()
    };
    for (i, symbol) in symbols.iter().enumerate() {
        let bars = generate_bars(symbol, &config, seed + i as u64);
        let path = write_symbol_csv(&out_dir, symbol, &bars)
            .with_context(|| format!("writing bars for {symbol}"))?;
        println!("Wrote {} bars to {}", bars.len(), path.display());
    }
    Ok(())
}

fn parse_strategy(name: &str) -> Result<StrategyChoice> {
    match name {
        "buy-and-hold" => Ok(StrategyChoice::BuyAndHold),
        "double-top" => Ok(StrategyChoice::DoubleTop {
            extrema: Default::default(),
            scan: Default::default(),
        }),
        other => bail!("unknown strategy '{other}' (expected buy-and-hold or double-top)"),
    }
}

fn print_report(report: &BacktestReport) {
    println!("Run {}", &report.run_id[..16.min(report.run_id.len())]);
    println!(
        "Strategy: {}  Symbols: {}",
        report.strategy,
        report.symbols.join(", ")
    );
    println!(
        "Bars: {}  Signals: {}  Orders: {}  Fills: {}",
        report.simulation.market_events,
        report.simulation.signal_events,
        report.simulation.order_events,
        report.simulation.fill_events,
    );
    if report.strategy == "double-top" {
        println!(
            "Patterns: {} detected, {} confirmed",
            report.patterns_detected, report.patterns_confirmed
        );
    }
    println!();
    println!("Total Return       {:>10.2}%", report.stats.total_return * 100.0);
    println!("Sharpe Ratio       {:>10.2}", report.stats.sharpe_ratio);
    println!("Max Drawdown       {:>10.2}%", report.stats.max_drawdown * 100.0);
    println!("Drawdown Duration  {:>10}", report.stats.drawdown_duration);
    println!("Final Total        {:>10.2}", report.final_total);
}
