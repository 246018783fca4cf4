//! Serializable backtest configuration.

use chrono::NaiveDate;
use patternlab_core::pattern::{ExtremaParams, ScanParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Everything needed to reproduce a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Directory of per-symbol CSV bar files.
    pub data_dir: PathBuf,

    /// Symbols to simulate. Empty means discover `*.csv` files in `data_dir`.
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Ledger start date. Defaults to the earliest loaded bar.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    /// Fixed commission charged per fill.
    #[serde(default = "default_commission")]
    pub commission: f64,

    pub strategy: StrategyChoice,
}

fn default_initial_capital() -> f64 {
    100_000.0
}

fn default_commission() -> f64 {
    1.0
}

impl BacktestConfig {
    pub fn new(data_dir: impl Into<PathBuf>, strategy: StrategyChoice) -> Self {
        Self {
            data_dir: data_dir.into(),
            symbols: Vec::new(),
            start_date: None,
            initial_capital: default_initial_capital(),
            commission: default_commission(),
            strategy,
        }
    }

    /// Load a TOML config file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share the same RunId, which makes
    /// result artifacts content-addressable.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BacktestConfig must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Strategy selection (serializable enum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyChoice {
    /// Long every symbol once, hold to the end.
    BuyAndHold,

    /// Double-top pattern detector.
    DoubleTop {
        #[serde(default)]
        extrema: ExtremaParams,
        #[serde(default)]
        scan: ScanParams,
    },
}

impl StrategyChoice {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyChoice::BuyAndHold => "buy-and-hold",
            StrategyChoice::DoubleTop { .. } => "double-top",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
