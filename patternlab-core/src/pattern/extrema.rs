//! Local extrema extraction with prominence and minimum-distance filtering.
//!
//! Maxima are detected on the high series, minima on the negated low series.
//! Detection follows the classic peak-finding discipline: plateau-aware
//! local maxima, a prominence threshold to suppress noise, then a greedy
//! highest-first pass that enforces a minimum horizontal separation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Peak detection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremaParams {
    /// Minimum horizontal separation between kept extrema, in bars.
    pub min_distance: usize,
    /// Minimum prominence an extreme must have, in price units.
    pub min_prominence: f64,
}

impl Default for ExtremaParams {
    fn default() -> Self {
        Self {
            min_distance: 10,
            min_prominence: 1.0,
        }
    }
}

/// Whether an extreme point is a trough or a peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtremaKind {
    Minimum,
    Maximum,
}

/// One detected extreme: position, date, and price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremePoint {
    pub index: usize,
    pub date: NaiveDate,
    pub value: f64,
    pub kind: ExtremaKind,
}

/// Local maxima of `highs` as dated extreme points.
pub fn local_maxima(
    dates: &[NaiveDate],
    highs: &[f64],
    params: &ExtremaParams,
) -> Vec<ExtremePoint> {
    peak_indices(highs, params)
        .into_iter()
        .map(|index| ExtremePoint {
            index,
            date: dates[index],
            value: highs[index],
            kind: ExtremaKind::Maximum,
        })
        .collect()
}

/// Local minima of `lows`, detected as peaks of the negated series.
pub fn local_minima(
    dates: &[NaiveDate],
    lows: &[f64],
    params: &ExtremaParams,
) -> Vec<ExtremePoint> {
    let negated: Vec<f64> = lows.iter().map(|v| -v).collect();
    peak_indices(&negated, params)
        .into_iter()
        .map(|index| ExtremePoint {
            index,
            date: dates[index],
            value: lows[index],
            kind: ExtremaKind::Minimum,
        })
        .collect()
}

/// Merge minima and maxima into one series sorted by bar index.
pub fn merge_extrema(minima: Vec<ExtremePoint>, maxima: Vec<ExtremePoint>) -> Vec<ExtremePoint> {
    let mut merged = minima;
    merged.extend(maxima);
    merged.sort_by_key(|point| point.index);
    merged
}

/// Indices of local maxima of `values`, filtered by prominence then distance.
pub fn peak_indices(values: &[f64], params: &ExtremaParams) -> Vec<usize> {
    let candidates = plateau_maxima(values);
    let prominent: Vec<usize> = candidates
        .into_iter()
        .filter(|&index| prominence(values, index) >= params.min_prominence)
        .collect();
    select_by_distance(values, prominent, params.min_distance)
}

/// Samples strictly greater than both neighbors; plateaus report their
/// midpoint. Endpoints are never peaks.
fn plateau_maxima(values: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    let n = values.len();
    if n < 3 {
        return peaks;
    }
    let mut i = 1;
    while i < n - 1 {
        if values[i - 1] < values[i] {
            let mut j = i;
            while j < n - 1 && values[j + 1] == values[i] {
                j += 1;
            }
            if j < n - 1 && values[j + 1] < values[i] {
                peaks.push((i + j) / 2);
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }
    peaks
}

/// Height of a peak above the higher of its two contour bases.
///
/// Each base is the lowest sample between the peak and the nearest strictly
/// higher sample on that side, or the series edge.
fn prominence(values: &[f64], peak: usize) -> f64 {
    let peak_value = values[peak];

    let mut left_base = peak_value;
    let mut i = peak;
    while i > 0 {
        i -= 1;
        if values[i] > peak_value {
            break;
        }
        if values[i] < left_base {
            left_base = values[i];
        }
    }

    let mut right_base = peak_value;
    let mut i = peak;
    while i + 1 < values.len() {
        i += 1;
        if values[i] > peak_value {
            break;
        }
        if values[i] < right_base {
            right_base = values[i];
        }
    }

    peak_value - left_base.max(right_base)
}

/// Greedy distance filter: the highest peaks win, lower peaks closer than
/// `min_distance` bars to a kept peak are removed.
fn select_by_distance(values: &[f64], peaks: Vec<usize>, min_distance: usize) -> Vec<usize> {
    if min_distance <= 1 || peaks.len() < 2 {
        return peaks;
    }

    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        values[peaks[a]]
            .partial_cmp(&values[peaks[b]])
            .unwrap_or(Ordering::Equal)
    });

    let mut keep = vec![true; peaks.len()];
    for &k in order.iter().rev() {
        if !keep[k] {
            continue;
        }
        let mut j = k;
        while j > 0 && peaks[k] - peaks[j - 1] < min_distance {
            j -= 1;
            keep[j] = false;
        }
        let mut j = k;
        while j + 1 < peaks.len() && peaks[j + 1] - peaks[k] < min_distance {
            j += 1;
            keep[j] = false;
        }
    }

    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(peak, kept)| kept.then_some(peak))
        .collect()
}
