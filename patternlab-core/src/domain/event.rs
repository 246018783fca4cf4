//! Event taxonomy — the four message kinds flowing through the queue.
//!
//! One simulation step cascades `Market → Signal → Order → Fill` through the
//! event queue. Each payload struct corresponds to one producer: the bar
//! source emits `MarketEvent`, strategies emit `SignalEvent`, the portfolio
//! emits `OrderEvent`, and the execution simulator emits `FillEvent`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A strategy's directional intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalType {
    Long,
    Short,
    Exit,
}

/// Side of an order or fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// Sign applied to position deltas and costs: +1 for buys, -1 for sells.
    pub fn sign(&self) -> i64 {
        match self {
            Direction::Buy => 1,
            Direction::Sell => -1,
        }
    }
}

/// Order pricing instruction. The simulator only supports market orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
}

/// A new bar is available for all symbols. Carries no payload beyond its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent;

/// A strategy's trading intent for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub symbol: String,
    pub datetime: NaiveDate,
    pub signal_type: SignalType,
    /// Normalized conviction in [0, 1], used to size order quantity.
    pub strength: f64,
}

impl SignalEvent {
    /// Build a signal; strength is clamped into [0, 1].
    pub fn new(
        symbol: impl Into<String>,
        datetime: NaiveDate,
        signal_type: SignalType,
        strength: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            datetime,
            signal_type,
            strength: strength.clamp(0.0, 1.0),
        }
    }
}

/// The portfolio's order instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub symbol: String,
    pub order_type: OrderType,
    pub quantity: u64,
    pub direction: Direction,
}

impl OrderEvent {
    pub fn market(symbol: impl Into<String>, quantity: u64, direction: Direction) -> Self {
        Self {
            symbol: symbol.into(),
            order_type: OrderType::Market,
            quantity,
            direction,
        }
    }
}

/// The realized execution of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    pub symbol: String,
    pub datetime: NaiveDate,
    pub exchange: String,
    pub quantity: u64,
    pub direction: Direction,
    /// Total notional of the fill: unit price times quantity.
    pub fill_cost: f64,
    pub commission: f64,
}

/// A queue message: exactly one of the four event kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Market(MarketEvent),
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Market(_) => EventKind::Market,
            Event::Signal(_) => EventKind::Signal,
            Event::Order(_) => EventKind::Order,
            Event::Fill(_) => EventKind::Fill,
        }
    }
}

/// Discriminant of an `Event`, used for dispatch accounting and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Market,
    Signal,
    Order,
    Fill,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Market => "MARKET",
            EventKind::Signal => "SIGNAL",
            EventKind::Order => "ORDER",
            EventKind::Fill => "FILL",
        };
        f.write_str(name)
    }
}
