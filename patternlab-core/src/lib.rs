//! Patternlab Core — event-driven simulation engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, the four event kinds, ledger snapshots)
//! - Unbounded FIFO event queue and the bar-driven simulation loop
//! - Bar sources (historic CSV replay behind the `BarSource` trait)
//! - Strategies (buy-and-hold baseline, double-top pattern detector)
//! - Portfolio ledger with naive constant-size order generation
//! - Simulated execution at the latest close with fixed commission
//! - Pattern machinery: prominence/distance extrema, candidate scanning,
//!   confirmation, risk annotation

pub mod data;
pub mod domain;
pub mod engine;
pub mod execution;
pub mod pattern;
pub mod portfolio;
pub mod strategy;

pub use data::{BarSource, DataError, HistoricBarSource};
pub use engine::{EventQueue, Simulation, SimulationError, SimulationReport};
pub use execution::{ExecutionHandler, SimulatedExecutionHandler};
pub use portfolio::{LedgerError, NaivePortfolio, Portfolio};
pub use strategy::{
    BuyAndHoldStrategy, DetectorPhase, DoubleTopConfig, DoubleTopStrategy, Strategy,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync, so a future runner
    /// can move whole simulations across worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Event>();
        require_sync::<domain::Event>();
        require_send::<domain::HoldingsSnapshot>();
        require_sync::<domain::HoldingsSnapshot>();
        require_send::<domain::PositionSnapshot>();
        require_sync::<domain::PositionSnapshot>();

        require_send::<EventQueue>();
        require_sync::<EventQueue>();
        require_send::<SimulationReport>();
        require_sync::<SimulationReport>();

        require_send::<HistoricBarSource>();
        require_sync::<HistoricBarSource>();
        require_send::<NaivePortfolio>();
        require_sync::<NaivePortfolio>();
        require_send::<SimulatedExecutionHandler>();
        require_sync::<SimulatedExecutionHandler>();
        require_send::<BuyAndHoldStrategy>();
        require_sync::<BuyAndHoldStrategy>();
        require_send::<DoubleTopStrategy>();
        require_sync::<DoubleTopStrategy>();

        require_send::<pattern::PatternTable>();
        require_sync::<pattern::PatternTable>();
        require_send::<pattern::PriceSeries>();
        require_sync::<pattern::PriceSeries>();
    }
}
