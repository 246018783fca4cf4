//! Chart-pattern recognition machinery.
//!
//! - `extrema`: prominence/distance peak detection over a price series
//! - `scanner`: double-top candidate windows, confirmation, risk annotation

pub mod extrema;
pub mod scanner;

pub use extrema::{local_maxima, local_minima, merge_extrema, ExtremaKind, ExtremaParams, ExtremePoint};
pub use scanner::{
    confirm_pending, enrich_candidate, scan_candidates, CandidateWindow, PatternRecord,
    PatternTable, ScanParams,
};

use crate::domain::Bar;
use chrono::NaiveDate;

/// Date-indexed price history accumulated bar by bar.
///
/// Columns stay parallel: `dates[i]`, `highs[i]`, `lows[i]`, and `closes[i]`
/// all describe the same bar. Dates are strictly increasing.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    pub dates: Vec<NaiveDate>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Append one bar. A bar dated at or before the last observation is
    /// ignored, so replaying the latest bar after source exhaustion is safe.
    pub fn push_bar(&mut self, bar: &Bar) {
        if let Some(&last) = self.dates.last() {
            if bar.date <= last {
                return;
            }
        }
        self.dates.push(bar.date);
        self.highs.push(bar.high);
        self.lows.push(bar.low);
        self.closes.push(bar.close);
    }

    /// Index of the exact date, if observed.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Index of the first observation strictly after `date`.
    pub fn index_after(&self, date: NaiveDate) -> usize {
        self.dates.partition_point(|&d| d <= date)
    }

    pub fn high_at(&self, date: NaiveDate) -> Option<f64> {
        self.index_of(date).map(|i| self.highs[i])
    }

    pub fn low_at(&self, date: NaiveDate) -> Option<f64> {
        self.index_of(date).map(|i| self.lows[i])
    }

    pub fn close_at(&self, date: NaiveDate) -> Option<f64> {
        self.index_of(date).map(|i| self.closes[i])
    }
}
