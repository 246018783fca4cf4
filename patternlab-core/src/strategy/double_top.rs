//! Double-top detection strategy — a per-symbol pattern state machine.

use super::Strategy;
use crate::data::BarSource;
use crate::domain::Bar;
use crate::engine::EventQueue;
use crate::pattern::{
    confirm_pending, enrich_candidate, local_maxima, local_minima, merge_extrema, scan_candidates,
    ExtremaParams, PatternTable, PriceSeries, ScanParams,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle phase of a symbol's detector.
///
/// Forward-only: `Scanning → Confirming → Buying`, never back. Once a
/// symbol reaches `Buying` its detector is done for the rest of the run,
/// so each symbol sees at most one pattern lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectorPhase {
    Scanning,
    Confirming,
    Buying,
}

/// Detector tunables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubleTopConfig {
    pub extrema: ExtremaParams,
    pub scan: ScanParams,
}

/// One symbol's detector: its phase, accumulated prices, and pattern table.
#[derive(Debug, Clone)]
struct SymbolDetector {
    phase: DetectorPhase,
    series: PriceSeries,
    table: PatternTable,
}

impl SymbolDetector {
    fn new() -> Self {
        Self {
            phase: DetectorPhase::Scanning,
            series: PriceSeries::new(),
            table: PatternTable::new(),
        }
    }

    fn on_bar(&mut self, bar: &Bar, config: &DoubleTopConfig) {
        self.series.push_bar(bar);

        match self.phase {
            DetectorPhase::Scanning => {
                // Extrema are recomputed from scratch over the whole
                // accumulated history, O(len) per bar. Acceptable for
                // backtest-scale series.
                let maxima = local_maxima(&self.series.dates, &self.series.highs, &config.extrema);
                let minima = local_minima(&self.series.dates, &self.series.lows, &config.extrema);
                let merged = merge_extrema(minima, maxima);

                for window in scan_candidates(&merged, &config.scan) {
                    if self.table.contains_candidate(
                        window.top1.date,
                        window.neck1.date,
                        window.top2.date,
                    ) {
                        continue;
                    }
                    if let Some(record) = enrich_candidate(&window, &self.series) {
                        self.table.push(record);
                    }
                }
                if self.table.any_detected() {
                    self.phase = DetectorPhase::Confirming;
                }
            }
            DetectorPhase::Confirming => {
                if confirm_pending(&mut self.table, &self.series) > 0 {
                    self.phase = DetectorPhase::Buying;
                }
            }
            // terminal: the detector never re-arms
            DetectorPhase::Buying => {}
        }
    }
}

/// Runs one `SymbolDetector` per symbol over the revealed bar stream.
///
/// The detector records candidates, confirmations, and risk annotations in
/// its pattern table but emits no signal events; the computed stop-loss and
/// target are not yet wired into order generation.
#[derive(Debug, Clone)]
pub struct DoubleTopStrategy {
    config: DoubleTopConfig,
    symbols: Vec<String>,
    detectors: HashMap<String, SymbolDetector>,
}

impl DoubleTopStrategy {
    pub fn new(symbols: Vec<String>, config: DoubleTopConfig) -> Self {
        let detectors = symbols
            .iter()
            .map(|s| (s.clone(), SymbolDetector::new()))
            .collect();
        Self {
            config,
            symbols,
            detectors,
        }
    }

    pub fn config(&self) -> &DoubleTopConfig {
        &self.config
    }

    /// Current phase of a symbol's detector.
    pub fn phase(&self, symbol: &str) -> Option<DetectorPhase> {
        self.detectors.get(symbol).map(|d| d.phase)
    }

    /// The symbol's pattern table, candidates and confirmations included.
    pub fn pattern_table(&self, symbol: &str) -> Option<&PatternTable> {
        self.detectors.get(symbol).map(|d| &d.table)
    }

    /// Total detected candidates across all symbols.
    pub fn detected_count(&self) -> usize {
        self.detectors.values().map(|d| d.table.len()).sum()
    }

    /// Total confirmed patterns across all symbols.
    pub fn confirmed_count(&self) -> usize {
        self.detectors
            .values()
            .map(|d| d.table.confirmed_count())
            .sum()
    }
}

impl Strategy for DoubleTopStrategy {
    fn name(&self) -> &str {
        "double-top"
    }

    fn calculate_signals(&mut self, data: &dyn BarSource, _events: &mut EventQueue) {
        for symbol in &self.symbols {
            let Ok(bars) = data.latest_bars(symbol, 1) else {
                // unknown symbol: nothing to observe this bar
                continue;
            };
            let Some(bar) = bars.last() else {
                continue;
            };
            if let Some(detector) = self.detectors.get_mut(symbol) {
                detector.on_bar(bar, &self.config);
            }
        }
    }
}
