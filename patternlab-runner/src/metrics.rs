//! Performance metrics — pure functions over the holdings history.
//!
//! Every metric is a pure function: equity values in, scalar out. The core
//! guarantees the holdings sequence is append-only and chronologically
//! ordered, which these functions rely on.

use patternlab_core::domain::HoldingsSnapshot;
use serde::{Deserialize, Serialize};

/// Trading periods per year for annualization of daily bars.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Summary statistics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Final cumulative return as a fraction (0.05 = +5%).
    pub total_return: f64,
    /// Annualized Sharpe ratio of period returns.
    pub sharpe_ratio: f64,
    /// Deepest peak-to-trough decline of the cumulative equity curve.
    pub max_drawdown: f64,
    /// Longest stretch of consecutive periods spent below a prior peak.
    pub drawdown_duration: usize,
}

impl SummaryStats {
    /// Compute all statistics from the holdings history.
    pub fn compute(holdings: &[HoldingsSnapshot]) -> Self {
        let totals: Vec<f64> = holdings.iter().map(|h| h.total).collect();
        let returns = period_returns(&totals);
        let curve = equity_curve(&returns);
        let (max_drawdown, drawdown_duration) = max_drawdown(&curve);
        Self {
            total_return: curve.last().map(|v| v - 1.0).unwrap_or(0.0),
            sharpe_ratio: sharpe_ratio(&returns, PERIODS_PER_YEAR),
            max_drawdown,
            drawdown_duration,
        }
    }
}

/// Percentage change of each total relative to the previous one.
pub fn period_returns(totals: &[f64]) -> Vec<f64> {
    totals
        .windows(2)
        .map(|pair| {
            if pair[0] == 0.0 {
                0.0
            } else {
                pair[1] / pair[0] - 1.0
            }
        })
        .collect()
}

/// Cumulative equity curve: running product of `1 + r`, starting at 1.0.
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(returns.len() + 1);
    let mut value = 1.0;
    curve.push(value);
    for r in returns {
        value *= 1.0 + r;
        curve.push(value);
    }
    curve
}

/// Annualized Sharpe ratio: `sqrt(periods) * mean(returns) / std(returns)`.
///
/// Returns 0.0 for fewer than two returns or zero variance. Benchmark is
/// zero (no risk-free adjustment).
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| (r - mean) * (r - mean))
        .sum::<f64>()
        / (returns.len() - 1) as f64;
    let std = variance.sqrt();
    if std < 1e-15 {
        return 0.0;
    }
    periods_per_year.sqrt() * mean / std
}

/// Maximum drawdown of a cumulative equity curve and its longest duration.
///
/// Drawdown at t is the gap between the running high-water mark and the
/// curve; duration counts consecutive periods spent underwater.
pub fn max_drawdown(curve: &[f64]) -> (f64, usize) {
    let mut high_water_mark = f64::MIN;
    let mut max_dd = 0.0_f64;
    let mut duration = 0usize;
    let mut max_duration = 0usize;

    for &value in curve {
        if value > high_water_mark {
            high_water_mark = value;
        }
        let drawdown = high_water_mark - value;
        if drawdown > max_dd {
            max_dd = drawdown;
        }
        if drawdown > 0.0 {
            duration += 1;
            if duration > max_duration {
                max_duration = duration;
            }
        } else {
            duration = 0;
        }
    }
    (max_dd, max_duration)
}
