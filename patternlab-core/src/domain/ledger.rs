//! Ledger snapshots — the append-only position and holdings history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Copy of all per-symbol positions at one time step.
///
/// Positive quantity is a long position, negative a short, zero flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub datetime: NaiveDate,
    pub positions: BTreeMap<String, i64>,
}

/// Mark-to-market state of the portfolio at one time step.
///
/// `total = cash + sum of per-symbol market values`. The total is computed
/// at snapshot construction and never assigned afterwards; appending one of
/// these per market event produces the equity curve consumed downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    pub datetime: NaiveDate,
    pub cash: f64,
    /// Cumulative commission paid since the start of the run.
    pub commission: f64,
    pub total: f64,
    pub market_values: BTreeMap<String, f64>,
}
