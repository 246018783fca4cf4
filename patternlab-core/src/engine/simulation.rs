//! Simulation loop — drives the bar source forward and drains the queue.
//!
//! One outer iteration advances every symbol by one bar, then dispatches
//! events until the queue is empty. Because dispatch may enqueue further
//! events, a single market event cascades `Market → Signal → Order → Fill`
//! within the same iteration, fully resolved before the next bar is
//! advanced. Strategies and the portfolio therefore never observe a
//! partially applied bar.

use super::{EventQueue, SimulationError};
use crate::data::BarSource;
use crate::domain::{Event, EventKind};
use crate::execution::ExecutionHandler;
use crate::portfolio::Portfolio;
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};

/// Dispatch accounting for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Event counts by kind.
    pub market_events: usize,
    pub signal_events: usize,
    pub order_events: usize,
    pub fill_events: usize,
    /// Every dispatched event kind, in dispatch order.
    pub dispatch_log: Vec<EventKind>,
}

impl SimulationReport {
    pub fn events_dispatched(&self) -> usize {
        self.dispatch_log.len()
    }
}

/// Composes a bar source, a strategy, a portfolio, and an execution
/// simulator around one event queue, and runs the outer loop to exhaustion.
pub struct Simulation<D, S, P, E> {
    data: D,
    strategy: S,
    portfolio: P,
    execution: E,
    events: EventQueue,
    report: SimulationReport,
}

impl<D, S, P, E> Simulation<D, S, P, E>
where
    D: BarSource,
    S: Strategy,
    P: Portfolio,
    E: ExecutionHandler,
{
    pub fn new(data: D, strategy: S, portfolio: P, execution: E) -> Self {
        Self {
            data,
            strategy,
            portfolio,
            execution,
            events: EventQueue::new(),
            report: SimulationReport::default(),
        }
    }

    /// Run to data exhaustion.
    ///
    /// Stops advancing once the bar source reports exhaustion, then finishes
    /// draining whatever remains in the queue. Ledger invariant violations
    /// abort the run; per-symbol data gaps do not.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        loop {
            if self.data.continue_backtest() {
                self.data.update_bars(&mut self.events);
            } else {
                break;
            }
            self.drain()?;
        }
        self.drain()?;
        Ok(())
    }

    fn drain(&mut self) -> Result<(), SimulationError> {
        while let Some(event) = self.events.pop() {
            self.dispatch(event)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, event: Event) -> Result<(), SimulationError> {
        self.report.dispatch_log.push(event.kind());
        match event {
            Event::Market(_) => {
                self.report.market_events += 1;
                self.strategy
                    .calculate_signals(&self.data, &mut self.events);
                self.portfolio
                    .update_timeindex(&self.data, &mut self.events);
            }
            Event::Signal(signal) => {
                self.report.signal_events += 1;
                self.portfolio.update_signal(&signal, &mut self.events);
            }
            Event::Order(order) => {
                self.report.order_events += 1;
                self.execution
                    .execute_order(&order, &self.data, &mut self.events)?;
            }
            Event::Fill(fill) => {
                self.report.fill_events += 1;
                self.portfolio.update_fill(&fill)?;
            }
        }
        Ok(())
    }

    pub fn report(&self) -> &SimulationReport {
        &self.report
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn portfolio(&self) -> &P {
        &self.portfolio
    }

    /// Decompose the simulation after a run, keeping the final report.
    pub fn into_parts(self) -> (D, S, P, E, SimulationReport) {
        (
            self.data,
            self.strategy,
            self.portfolio,
            self.execution,
            self.report,
        )
    }
}
