//! Naive constant-size portfolio.

use super::{LedgerError, Portfolio};
use crate::data::BarSource;
use crate::domain::{
    Bar, Direction, Event, FillEvent, HoldingsSnapshot, OrderEvent, PositionSnapshot, SignalEvent,
    SignalType,
};
use crate::engine::EventQueue;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

/// Default base order size; actual quantity is `floor(base * strength)`.
pub const DEFAULT_BASE_QUANTITY: u64 = 100;

/// Sends constant-quantity orders without risk management or position
/// sizing. Used to exercise simple strategies and as a benchmark ledger.
///
/// Sizing rule, given the current signed position `q`:
/// - LONG signal and `q == 0` buys `floor(base * strength)`
/// - SHORT signal and `q == 0` sells the same quantity
/// - EXIT signal flattens whatever `q` is open
/// - everything else produces no order (no pyramiding)
#[derive(Debug, Clone)]
pub struct NaivePortfolio {
    symbols: Vec<String>,
    initial_capital: f64,
    base_quantity: u64,

    current_positions: BTreeMap<String, i64>,
    cash: f64,
    commission: f64,

    all_positions: Vec<PositionSnapshot>,
    all_holdings: Vec<HoldingsSnapshot>,
}

impl NaivePortfolio {
    /// Start a ledger at `start_date` with `initial_capital` in cash.
    ///
    /// The initial snapshot row carries the start date and a flat position
    /// for every symbol.
    pub fn new(symbols: Vec<String>, start_date: NaiveDate, initial_capital: f64) -> Self {
        let current_positions: BTreeMap<String, i64> =
            symbols.iter().map(|s| (s.clone(), 0)).collect();
        let market_values: BTreeMap<String, f64> =
            symbols.iter().map(|s| (s.clone(), 0.0)).collect();

        let all_positions = vec![PositionSnapshot {
            datetime: start_date,
            positions: current_positions.clone(),
        }];
        let all_holdings = vec![HoldingsSnapshot {
            datetime: start_date,
            cash: initial_capital,
            commission: 0.0,
            total: initial_capital,
            market_values,
        }];

        Self {
            symbols,
            initial_capital,
            base_quantity: DEFAULT_BASE_QUANTITY,
            current_positions,
            cash: initial_capital,
            commission: 0.0,
            all_positions,
            all_holdings,
        }
    }

    /// Override the base order size used by the sizing rule.
    pub fn with_base_quantity(mut self, base_quantity: u64) -> Self {
        self.base_quantity = base_quantity;
        self
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Cumulative commission paid since the start of the run.
    pub fn cumulative_commission(&self) -> f64 {
        self.commission
    }

    /// Current signed position for a symbol; zero when flat or unknown.
    pub fn position(&self, symbol: &str) -> i64 {
        self.current_positions.get(symbol).copied().unwrap_or(0)
    }

    /// Append-only position history, oldest first.
    pub fn positions_history(&self) -> &[PositionSnapshot] {
        &self.all_positions
    }

    /// Append-only holdings history, oldest first. This is the equity curve.
    pub fn holdings_history(&self) -> &[HoldingsSnapshot] {
        &self.all_holdings
    }

    fn generate_naive_order(&self, signal: &SignalEvent) -> Option<OrderEvent> {
        let quantity = (self.base_quantity as f64 * signal.strength).floor() as u64;
        let current = self.position(&signal.symbol);

        match (signal.signal_type, current) {
            (SignalType::Long, 0) => {
                Some(OrderEvent::market(&signal.symbol, quantity, Direction::Buy))
            }
            (SignalType::Short, 0) => Some(OrderEvent::market(
                &signal.symbol,
                quantity,
                Direction::Sell,
            )),
            (SignalType::Exit, q) if q > 0 => Some(OrderEvent::market(
                &signal.symbol,
                q.unsigned_abs(),
                Direction::Sell,
            )),
            (SignalType::Exit, q) if q < 0 => Some(OrderEvent::market(
                &signal.symbol,
                q.unsigned_abs(),
                Direction::Buy,
            )),
            // no pyramiding: signals that stack onto an open position are dropped
            _ => None,
        }
    }
}

impl Portfolio for NaivePortfolio {
    fn update_timeindex(&mut self, data: &dyn BarSource, _events: &mut EventQueue) {
        // Fetch the freshest bar for every symbol before touching the
        // ledger; a missing history leaves the ledger untouched.
        let mut latest: Vec<Bar> = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            match data.latest_bars(symbol, 1) {
                Ok(bars) if !bars.is_empty() => latest.push(bars[bars.len() - 1].clone()),
                Ok(_) => {
                    warn!(%symbol, "no bar history yet, skipping snapshot");
                    return;
                }
                Err(error) => {
                    warn!(%symbol, %error, "bar history unavailable, skipping snapshot");
                    return;
                }
            }
        }

        // Cross-symbol ordering is fixed to symbol-list order; the first
        // symbol's bar dates the snapshot.
        let datetime = latest[0].date;

        let mut market_values = BTreeMap::new();
        let mut total = self.cash;
        for (symbol, bar) in self.symbols.iter().zip(&latest) {
            // mark-to-market at the close of the bar just received, never a
            // future bar
            let market_value = self.position(symbol) as f64 * bar.close;
            total += market_value;
            market_values.insert(symbol.clone(), market_value);
        }

        self.all_positions.push(PositionSnapshot {
            datetime,
            positions: self.current_positions.clone(),
        });
        self.all_holdings.push(HoldingsSnapshot {
            datetime,
            cash: self.cash,
            commission: self.commission,
            total,
            market_values,
        });
    }

    fn update_signal(&mut self, signal: &SignalEvent, events: &mut EventQueue) {
        if let Some(order) = self.generate_naive_order(signal) {
            events.push(Event::Order(order));
        }
    }

    fn update_fill(&mut self, fill: &FillEvent) -> Result<(), LedgerError> {
        let position = self
            .current_positions
            .get_mut(&fill.symbol)
            .ok_or_else(|| LedgerError::UnknownSymbol {
                symbol: fill.symbol.clone(),
            })?;

        let sign = fill.direction.sign();
        *position += sign * fill.quantity as i64;

        let cost = sign as f64 * fill.fill_cost;
        self.cash -= cost + fill.commission;
        self.commission += fill.commission;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoricBarSource;
    use std::collections::HashMap;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    fn signal(signal_type: SignalType, strength: f64) -> SignalEvent {
        SignalEvent::new("ABC", day(2), signal_type, strength)
    }

    fn fill(direction: Direction, quantity: u64, fill_cost: f64, commission: f64) -> FillEvent {
        FillEvent {
            symbol: "ABC".to_string(),
            datetime: day(2),
            exchange: "SIMULATED".to_string(),
            quantity,
            direction,
            fill_cost,
            commission,
        }
    }

    fn portfolio() -> NaivePortfolio {
        NaivePortfolio::new(vec!["ABC".to_string()], day(1), 100_000.0)
    }

    #[test]
    fn long_signal_while_flat_buys_sized_quantity() {
        let mut pf = portfolio();
        let mut events = EventQueue::new();
        pf.update_signal(&signal(SignalType::Long, 1.0), &mut events);

        let Some(Event::Order(order)) = events.pop() else {
            panic!("expected an order event");
        };
        assert_eq!(order.quantity, 100);
        assert_eq!(order.direction, Direction::Buy);
    }

    #[test]
    fn quantity_scales_with_strength() {
        let mut pf = portfolio();
        let mut events = EventQueue::new();
        pf.update_signal(&signal(SignalType::Short, 0.57), &mut events);

        let Some(Event::Order(order)) = events.pop() else {
            panic!("expected an order event");
        };
        assert_eq!(order.quantity, 57);
        assert_eq!(order.direction, Direction::Sell);
    }

    #[test]
    fn long_signal_while_long_is_ignored() {
        let mut pf = portfolio();
        pf.update_fill(&fill(Direction::Buy, 100, 1_000.0, 1.0))
            .unwrap();

        let mut events = EventQueue::new();
        pf.update_signal(&signal(SignalType::Long, 1.0), &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn exit_signal_while_flat_is_ignored() {
        let mut pf = portfolio();
        let mut events = EventQueue::new();
        pf.update_signal(&signal(SignalType::Exit, 1.0), &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn exit_signal_flattens_long() {
        let mut pf = portfolio();
        pf.update_fill(&fill(Direction::Buy, 100, 1_000.0, 1.0))
            .unwrap();

        let mut events = EventQueue::new();
        pf.update_signal(&signal(SignalType::Exit, 0.2), &mut events);
        let Some(Event::Order(order)) = events.pop() else {
            panic!("expected an order event");
        };
        // exits flatten the full position regardless of strength
        assert_eq!(order.quantity, 100);
        assert_eq!(order.direction, Direction::Sell);
    }

    #[test]
    fn exit_signal_flattens_short() {
        let mut pf = portfolio();
        pf.update_fill(&fill(Direction::Sell, 40, 400.0, 1.0))
            .unwrap();
        assert_eq!(pf.position("ABC"), -40);

        let mut events = EventQueue::new();
        pf.update_signal(&signal(SignalType::Exit, 1.0), &mut events);
        let Some(Event::Order(order)) = events.pop() else {
            panic!("expected an order event");
        };
        assert_eq!(order.quantity, 40);
        assert_eq!(order.direction, Direction::Buy);
    }

    #[test]
    fn buy_fill_moves_cash_and_position() {
        let mut pf = portfolio();
        pf.update_fill(&fill(Direction::Buy, 100, 1_000.0, 1.3))
            .unwrap();

        assert_eq!(pf.position("ABC"), 100);
        assert!((pf.cash() - (100_000.0 - 1_000.0 - 1.3)).abs() < 1e-10);
        assert!((pf.cumulative_commission() - 1.3).abs() < 1e-10);
    }

    #[test]
    fn sell_fill_returns_cash() {
        let mut pf = portfolio();
        pf.update_fill(&fill(Direction::Buy, 100, 1_000.0, 1.0))
            .unwrap();
        pf.update_fill(&fill(Direction::Sell, 100, 1_100.0, 1.0))
            .unwrap();

        assert_eq!(pf.position("ABC"), 0);
        assert!((pf.cash() - (100_000.0 - 1_000.0 + 1_100.0 - 2.0)).abs() < 1e-10);
    }

    #[test]
    fn fill_for_unknown_symbol_is_a_ledger_error() {
        let mut pf = portfolio();
        let mut bad = fill(Direction::Buy, 10, 100.0, 1.0);
        bad.symbol = "XYZ".to_string();
        assert!(matches!(
            pf.update_fill(&bad),
            Err(LedgerError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn timeindex_appends_snapshot_at_latest_close() {
        let mut bars = HashMap::new();
        bars.insert(
            "ABC".to_string(),
            vec![Bar {
                symbol: "ABC".to_string(),
                date: day(2),
                open: 10.0,
                high: 10.5,
                low: 9.5,
                close: 10.0,
                volume: 1_000.0,
            }],
        );
        let mut data = HistoricBarSource::from_bars(vec!["ABC".to_string()], bars).unwrap();
        let mut events = EventQueue::new();
        data.update_bars(&mut events);

        let mut pf = portfolio();
        pf.update_fill(&fill(Direction::Buy, 100, 1_000.0, 1.0))
            .unwrap();
        pf.update_timeindex(&data, &mut events);

        let holdings = pf.holdings_history();
        // initial row plus one appended snapshot
        assert_eq!(holdings.len(), 2);
        let last = &holdings[1];
        assert_eq!(last.datetime, day(2));
        assert!((last.market_values["ABC"] - 1_000.0).abs() < 1e-10);
        assert!((last.total - (100_000.0 - 1.0)).abs() < 1e-10);
    }

    #[test]
    fn timeindex_skips_when_history_is_empty() {
        let mut bars = HashMap::new();
        bars.insert("ABC".to_string(), Vec::new());
        let data = HistoricBarSource::from_bars(vec!["ABC".to_string()], bars).unwrap();

        let mut pf = portfolio();
        let mut events = EventQueue::new();
        pf.update_timeindex(&data, &mut events);
        // only the construction row remains
        assert_eq!(pf.holdings_history().len(), 1);
    }
}
