//! Strategies — consume market events, read recent bars, emit signals.

mod buy_and_hold;
mod double_top;

pub use buy_and_hold::BuyAndHoldStrategy;
pub use double_top::{DetectorPhase, DoubleTopConfig, DoubleTopStrategy};

use crate::data::BarSource;
use crate::engine::EventQueue;

/// A trading strategy.
///
/// Strategies are agnostic to the data source: they read revealed bars
/// through the `BarSource` trait and push `SignalEvent`s onto the queue,
/// which makes the same strategy usable against historic and live feeds.
pub trait Strategy {
    /// Name shown in run reports.
    fn name(&self) -> &str;

    /// React to a new market bar for all symbols.
    fn calculate_signals(&mut self, data: &dyn BarSource, events: &mut EventQueue);
}
