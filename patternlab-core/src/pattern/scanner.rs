//! Double-top candidate scanning, confirmation, and risk annotation.
//!
//! A double top is a peak-trough-peak shape: two near-equal tops separated
//! by a trough (the neckline). The pattern is only tradeable once price
//! closes below the neckline after the second top.

use super::extrema::{ExtremaKind, ExtremePoint};
use super::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parameters for the 3-point candidate window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanParams {
    /// The whole pattern must form within this many days.
    pub max_span_days: i64,
    /// Maximum relative gap between the two tops: `|A - C| <= tol * mean(A, C)`.
    pub top_tolerance: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            max_span_days: 100,
            top_tolerance: 0.1,
        }
    }
}

/// Three consecutive extrema forming a double-top candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateWindow {
    pub top1: ExtremePoint,
    pub neck1: ExtremePoint,
    pub top2: ExtremePoint,
}

/// One row of the pattern table.
///
/// A row is born detected, later transitions to confirmed, and picks up its
/// risk fields at confirmation. Optional fields are `None` until the
/// corresponding transition happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub top1_date: NaiveDate,
    pub neck1_date: NaiveDate,
    pub top2_date: NaiveDate,
    pub top1_price: f64,
    pub neck1_price: f64,
    pub top2_price: f64,
    pub is_detected: bool,
    pub confirmation_date: Option<NaiveDate>,
    /// Days between the second top and the neckline break.
    pub time_for_confirmation: Option<i64>,
    pub is_confirmed: bool,
    /// -1 once confirmed: the pattern carries a short bias.
    pub signal: Option<i8>,
    pub stoploss: Option<f64>,
    pub top_length: Option<f64>,
    pub target: Option<f64>,
}

/// Append-only table of pattern records for one symbol.
///
/// Records are never edited in place: a state transition replaces the record
/// at a known index with an updated copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternTable {
    records: Vec<PatternRecord>,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PatternRecord) {
        self.records.push(record);
    }

    /// Replace the record at `index` with an updated copy.
    pub fn replace(&mut self, index: usize, record: PatternRecord) {
        self.records[index] = record;
    }

    pub fn records(&self) -> &[PatternRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn any_detected(&self) -> bool {
        self.records.iter().any(|r| r.is_detected)
    }

    /// Indices of detected rows still waiting for a neckline break.
    pub fn pending_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_detected && !r.is_confirmed)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn confirmed(&self) -> impl Iterator<Item = &PatternRecord> {
        self.records.iter().filter(|r| r.is_confirmed)
    }

    pub fn confirmed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_confirmed).count()
    }

    /// Whether a candidate with these three dates is already recorded.
    pub fn contains_candidate(
        &self,
        top1_date: NaiveDate,
        neck1_date: NaiveDate,
        top2_date: NaiveDate,
    ) -> bool {
        self.records.iter().any(|r| {
            r.top1_date == top1_date && r.neck1_date == neck1_date && r.top2_date == top2_date
        })
    }
}

/// Slide a 3-point window across the merged extrema series and collect every
/// double-top candidate.
///
/// Fewer than three extrema yields no candidates; that is not an error.
pub fn scan_candidates(extrema: &[ExtremePoint], params: &ScanParams) -> Vec<CandidateWindow> {
    let mut candidates = Vec::new();
    if extrema.len() < 3 {
        return candidates;
    }
    for window in extrema.windows(3) {
        let (a, b, c) = (window[0], window[1], window[2]);

        // the pattern must form within a bounded horizon
        if (c.date - a.date).num_days() > params.max_span_days {
            continue;
        }
        // peak-trough-peak shape
        if a.kind != ExtremaKind::Maximum
            || b.kind != ExtremaKind::Minimum
            || c.kind != ExtremaKind::Maximum
        {
            continue;
        }
        // trough strictly below both tops
        if !(b.value < a.value && b.value < c.value) {
            continue;
        }
        // near-equal tops
        let mean_top = (a.value + c.value) / 2.0;
        if (a.value - c.value).abs() > params.top_tolerance * mean_top {
            continue;
        }

        candidates.push(CandidateWindow {
            top1: a,
            neck1: b,
            top2: c,
        });
    }
    candidates
}

/// Attach prices to a candidate window and mark it detected.
///
/// Prices come from the series at the recorded dates: highs for the tops,
/// the low for the neckline. Returns `None` if any date is not in the
/// series, which cannot happen for extrema derived from it.
pub fn enrich_candidate(window: &CandidateWindow, series: &PriceSeries) -> Option<PatternRecord> {
    Some(PatternRecord {
        top1_date: window.top1.date,
        neck1_date: window.neck1.date,
        top2_date: window.top2.date,
        top1_price: series.high_at(window.top1.date)?,
        neck1_price: series.low_at(window.neck1.date)?,
        top2_price: series.high_at(window.top2.date)?,
        is_detected: true,
        confirmation_date: None,
        time_for_confirmation: None,
        is_confirmed: false,
        signal: None,
        stoploss: None,
        top_length: None,
        target: None,
    })
}

/// Resolve pending records against the close series.
///
/// A record confirms on the first close strictly after `top2_date` that
/// breaks below the neckline. Confirmed records get their short-bias signal
/// and risk annotation; unconfirmed records stay pending for the next pass.
/// Returns the number of records confirmed this pass.
pub fn confirm_pending(table: &mut PatternTable, series: &PriceSeries) -> usize {
    let mut confirmed = 0;
    for index in table.pending_indices() {
        let record = &table.records()[index];
        let start = series.index_after(record.top2_date);
        let neckline = record.neck1_price;

        let hit = (start..series.len()).find(|&i| series.closes[i] < neckline);
        let Some(i) = hit else {
            continue;
        };

        let confirmation_date = series.dates[i];
        let mut updated = record.clone();
        updated.confirmation_date = Some(confirmation_date);
        updated.time_for_confirmation = Some((confirmation_date - updated.top2_date).num_days());
        updated.signal = Some(-1);
        updated.is_confirmed = true;
        annotate_risk(&mut updated);
        table.replace(index, updated);
        confirmed += 1;
    }
    confirmed
}

/// Stop-loss, pattern height, and measured-move target for a confirmed
/// record: stop 1% above the second top, target the pattern's height
/// projected below the neckline.
pub fn annotate_risk(record: &mut PatternRecord) {
    let stoploss = round2(record.top2_price * 1.01);
    let top_length = round2(record.top2_price - record.neck1_price);
    let target = round2(record.neck1_price - top_length);
    record.stoploss = Some(stoploss);
    record.top_length = Some(top_length);
    record.target = Some(target);
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    fn point(index: usize, day_of_month: u32, value: f64, kind: ExtremaKind) -> ExtremePoint {
        ExtremePoint {
            index,
            date: day(day_of_month),
            value,
            kind,
        }
    }

    fn max(index: usize, day_of_month: u32, value: f64) -> ExtremePoint {
        point(index, day_of_month, value, ExtremaKind::Maximum)
    }

    fn min(index: usize, day_of_month: u32, value: f64) -> ExtremePoint {
        point(index, day_of_month, value, ExtremaKind::Minimum)
    }

    fn bar(date: NaiveDate, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            symbol: "ABC".to_string(),
            date,
            open: close,
            high,
            low,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn accepts_well_formed_double_top() {
        let extrema = vec![max(0, 2, 100.0), min(5, 7, 90.0), max(10, 12, 101.0)];
        let candidates = scan_candidates(&extrema, &ScanParams::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].top1.date, day(2));
        assert_eq!(candidates[0].neck1.date, day(7));
        assert_eq!(candidates[0].top2.date, day(12));
    }

    #[test]
    fn rejects_trough_above_first_top() {
        // B > A: the middle point is not a trough below both peaks
        let extrema = vec![max(0, 2, 100.0), min(5, 7, 105.0), max(10, 12, 101.0)];
        assert!(scan_candidates(&extrema, &ScanParams::default()).is_empty());
    }

    #[test]
    fn rejects_wrong_shape() {
        let extrema = vec![min(0, 2, 90.0), max(5, 7, 100.0), min(10, 12, 91.0)];
        assert!(scan_candidates(&extrema, &ScanParams::default()).is_empty());
    }

    #[test]
    fn rejects_unequal_tops() {
        // tops differ by more than 10% of their mean
        let extrema = vec![max(0, 2, 100.0), min(5, 7, 80.0), max(10, 12, 130.0)];
        assert!(scan_candidates(&extrema, &ScanParams::default()).is_empty());
    }

    #[test]
    fn rejects_pattern_spanning_too_long() {
        let extrema = vec![
            max(0, 2, 100.0),
            min(5, 7, 90.0),
            ExtremePoint {
                index: 150,
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                value: 101.0,
                kind: ExtremaKind::Maximum,
            },
        ];
        assert!(scan_candidates(&extrema, &ScanParams::default()).is_empty());
    }

    #[test]
    fn fewer_than_three_extrema_is_empty_not_an_error() {
        let extrema = vec![max(0, 2, 100.0), min(5, 7, 90.0)];
        assert!(scan_candidates(&extrema, &ScanParams::default()).is_empty());
    }

    #[test]
    fn enrichment_reads_prices_at_recorded_dates() {
        let mut series = PriceSeries::new();
        series.push_bar(&bar(day(2), 100.0, 95.0, 98.0));
        series.push_bar(&bar(day(7), 93.0, 90.0, 91.0));
        series.push_bar(&bar(day(12), 101.0, 96.0, 99.0));

        let window = CandidateWindow {
            top1: max(0, 2, 100.0),
            neck1: min(1, 7, 90.0),
            top2: max(2, 12, 101.0),
        };
        let record = enrich_candidate(&window, &series).unwrap();
        assert!(record.is_detected);
        assert_eq!(record.top1_price, 100.0);
        assert_eq!(record.neck1_price, 90.0);
        assert_eq!(record.top2_price, 101.0);
        assert!(!record.is_confirmed);
    }

    #[test]
    fn confirmation_finds_first_close_below_neckline() {
        let mut series = PriceSeries::new();
        series.push_bar(&bar(day(2), 110.0, 100.0, 105.0));
        series.push_bar(&bar(day(5), 102.0, 100.0, 101.0));
        series.push_bar(&bar(day(10), 110.0, 101.0, 106.0));
        // three bars after the second top, the close breaks 100
        series.push_bar(&bar(day(11), 105.0, 101.0, 102.0));
        series.push_bar(&bar(day(12), 103.0, 100.0, 101.0));
        series.push_bar(&bar(day(13), 101.0, 94.0, 95.0));

        let mut table = PatternTable::new();
        let window = CandidateWindow {
            top1: max(0, 2, 110.0),
            neck1: min(1, 5, 100.0),
            top2: max(2, 10, 110.0),
        };
        table.push(enrich_candidate(&window, &series).unwrap());

        let confirmed = confirm_pending(&mut table, &series);
        assert_eq!(confirmed, 1);

        let record = &table.records()[0];
        assert!(record.is_confirmed);
        assert_eq!(record.confirmation_date, Some(day(13)));
        assert_eq!(record.time_for_confirmation, Some(3));
        assert_eq!(record.signal, Some(-1));
    }

    #[test]
    fn unbroken_neckline_stays_pending() {
        let mut series = PriceSeries::new();
        series.push_bar(&bar(day(2), 110.0, 100.0, 105.0));
        series.push_bar(&bar(day(5), 102.0, 100.0, 101.0));
        series.push_bar(&bar(day(10), 110.0, 101.0, 106.0));
        series.push_bar(&bar(day(11), 106.0, 102.0, 104.0));

        let mut table = PatternTable::new();
        let window = CandidateWindow {
            top1: max(0, 2, 110.0),
            neck1: min(1, 5, 100.0),
            top2: max(2, 10, 110.0),
        };
        table.push(enrich_candidate(&window, &series).unwrap());

        assert_eq!(confirm_pending(&mut table, &series), 0);
        let record = &table.records()[0];
        assert!(!record.is_confirmed);
        assert_eq!(record.confirmation_date, None);
        // still pending, re-evaluated on the next pass
        assert_eq!(table.pending_indices(), vec![0]);
    }

    #[test]
    fn risk_annotation_numbers() {
        let mut record = PatternRecord {
            top1_date: day(2),
            neck1_date: day(5),
            top2_date: day(10),
            top1_price: 110.0,
            neck1_price: 100.0,
            top2_price: 110.0,
            is_detected: true,
            confirmation_date: None,
            time_for_confirmation: None,
            is_confirmed: true,
            signal: Some(-1),
            stoploss: None,
            top_length: None,
            target: None,
        };
        annotate_risk(&mut record);
        // stop 1% above the second top
        assert_eq!(record.stoploss, Some(111.1));
        // measured move: height projected below the neckline
        assert_eq!(record.top_length, Some(10.0));
        assert_eq!(record.target, Some(90.0));
    }

    #[test]
    fn table_dedupes_by_candidate_dates() {
        let mut table = PatternTable::new();
        let mut series = PriceSeries::new();
        series.push_bar(&bar(day(2), 100.0, 95.0, 98.0));
        series.push_bar(&bar(day(7), 93.0, 90.0, 91.0));
        series.push_bar(&bar(day(12), 101.0, 96.0, 99.0));

        let window = CandidateWindow {
            top1: max(0, 2, 100.0),
            neck1: min(1, 7, 90.0),
            top2: max(2, 12, 101.0),
        };
        table.push(enrich_candidate(&window, &series).unwrap());
        assert!(table.contains_candidate(day(2), day(7), day(12)));
        assert!(!table.contains_candidate(day(2), day(7), day(13)));
    }
}
