//! Buy-and-hold baseline strategy.

use super::Strategy;
use crate::data::BarSource;
use crate::domain::{Event, SignalEvent, SignalType};
use crate::engine::EventQueue;
use std::collections::HashMap;

/// Goes long every symbol as soon as two bars of history exist, then never
/// trades again. Primarily a benchmark and a test fixture for the event
/// cascade.
#[derive(Debug, Clone)]
pub struct BuyAndHoldStrategy {
    symbols: Vec<String>,
    bought: HashMap<String, bool>,
}

impl BuyAndHoldStrategy {
    pub fn new(symbols: Vec<String>) -> Self {
        let bought = symbols.iter().map(|s| (s.clone(), false)).collect();
        Self { symbols, bought }
    }

    /// Whether the one-shot long signal has fired for `symbol`.
    pub fn bought(&self, symbol: &str) -> bool {
        self.bought.get(symbol).copied().unwrap_or(false)
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn name(&self) -> &str {
        "buy-and-hold"
    }

    fn calculate_signals(&mut self, data: &dyn BarSource, events: &mut EventQueue) {
        for symbol in &self.symbols {
            let Ok(bars) = data.latest_bars(symbol, 2) else {
                // absent bars mean no signal this bar
                continue;
            };
            if bars.len() < 2 {
                continue;
            }
            let already_bought = self.bought.get(symbol).copied().unwrap_or(false);
            if already_bought {
                continue;
            }
            // date the signal at the earliest bar of the window
            events.push(Event::Signal(SignalEvent::new(
                symbol.clone(),
                bars[0].date,
                SignalType::Long,
                1.0,
            )));
            self.bought.insert(symbol.clone(), true);
        }
    }
}
