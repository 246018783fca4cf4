//! Engine: event queue and the bar-driven simulation loop.

mod queue;
mod simulation;

pub use queue::EventQueue;
pub use simulation::{Simulation, SimulationReport};

use crate::data::DataError;
use crate::portfolio::LedgerError;
use thiserror::Error;

/// Failure of a simulation run.
///
/// Recoverable "data not yet available" conditions never reach this level;
/// anything that does is an invariant violation and halts the run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
