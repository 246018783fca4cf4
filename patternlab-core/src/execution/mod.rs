//! Simulated order execution.

use crate::data::{BarSource, DataError};
use crate::domain::{Event, FillEvent, OrderEvent};
use crate::engine::EventQueue;

/// Turns orders into fills.
///
/// The simulator has no rejection path: every order produces exactly one
/// fill. A live broker adapter would implement the same trait.
pub trait ExecutionHandler {
    fn execute_order(
        &mut self,
        order: &OrderEvent,
        data: &dyn BarSource,
        events: &mut EventQueue,
    ) -> Result<(), DataError>;
}

/// Fills every order immediately at the latest close with a fixed
/// commission. No slippage, no latency, no partial fills.
#[derive(Debug, Clone)]
pub struct SimulatedExecutionHandler {
    exchange: String,
    commission: f64,
}

impl SimulatedExecutionHandler {
    pub fn new(commission: f64) -> Self {
        Self {
            exchange: "SIMULATED".to_string(),
            commission,
        }
    }

    pub fn commission(&self) -> f64 {
        self.commission
    }
}

impl Default for SimulatedExecutionHandler {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ExecutionHandler for SimulatedExecutionHandler {
    fn execute_order(
        &mut self,
        order: &OrderEvent,
        data: &dyn BarSource,
        events: &mut EventQueue,
    ) -> Result<(), DataError> {
        let bars = data.latest_bars(&order.symbol, 1)?;
        let bar = bars
            .last()
            .ok_or_else(|| DataError::EmptySeries(order.symbol.clone()))?;

        events.push(Event::Fill(FillEvent {
            symbol: order.symbol.clone(),
            datetime: bar.date,
            exchange: self.exchange.clone(),
            quantity: order.quantity,
            direction: order.direction,
            fill_cost: bar.close * order.quantity as f64,
            commission: self.commission,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoricBarSource;
    use crate::domain::{Bar, Direction};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn source_with_one_bar(close: f64) -> HistoricBarSource {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut bars = HashMap::new();
        bars.insert(
            "ABC".to_string(),
            vec![Bar {
                symbol: "ABC".to_string(),
                date,
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1_000.0,
            }],
        );
        HistoricBarSource::from_bars(vec!["ABC".to_string()], bars).unwrap()
    }

    #[test]
    fn fills_at_latest_close_with_fixed_commission() {
        let mut data = source_with_one_bar(12.5);
        let mut events = EventQueue::new();
        data.update_bars(&mut events);
        events.pop(); // drop the market event

        let mut handler = SimulatedExecutionHandler::new(1.3);
        let order = OrderEvent::market("ABC", 100, Direction::Buy);
        handler.execute_order(&order, &data, &mut events).unwrap();

        let Some(Event::Fill(fill)) = events.pop() else {
            panic!("expected a fill event");
        };
        assert_eq!(fill.quantity, 100);
        assert_eq!(fill.direction, Direction::Buy);
        assert!((fill.fill_cost - 1_250.0).abs() < 1e-10);
        assert!((fill.commission - 1.3).abs() < 1e-10);
    }

    #[test]
    fn order_before_any_bar_is_an_error() {
        let data = source_with_one_bar(12.5);
        let mut events = EventQueue::new();
        let mut handler = SimulatedExecutionHandler::default();
        let order = OrderEvent::market("ABC", 100, Direction::Buy);
        assert!(matches!(
            handler.execute_order(&order, &data, &mut events),
            Err(DataError::EmptySeries(_))
        ));
    }
}
