//! Portfolio — positions and market value of all instruments at bar
//! resolution.

mod naive;

pub use naive::NaivePortfolio;

use crate::data::BarSource;
use crate::domain::{FillEvent, SignalEvent};
use crate::engine::EventQueue;
use thiserror::Error;

/// Ledger invariant violations.
///
/// These are programmer errors, not data conditions: a fill can only exist
/// for a symbol the portfolio was constructed with. The simulation loop
/// halts on them instead of continuing with a corrupted ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("fill received for unknown symbol '{symbol}'")]
    UnknownSymbol { symbol: String },
}

/// Position and holdings bookkeeping driven by market, signal, and fill
/// events.
pub trait Portfolio {
    /// Record a new position and holdings snapshot for the bar just
    /// received. Must only use data available at or before that bar.
    fn update_timeindex(&mut self, data: &dyn BarSource, events: &mut EventQueue);

    /// Translate a signal into at most one order.
    fn update_signal(&mut self, signal: &SignalEvent, events: &mut EventQueue);

    /// Apply a fill to positions and holdings. Both updates complete before
    /// any other event is dispatched.
    fn update_fill(&mut self, fill: &FillEvent) -> Result<(), LedgerError>;
}
