//! Domain types: bars, events, and ledger snapshots.

pub mod bar;
pub mod event;
pub mod ledger;

pub use bar::Bar;
pub use event::{
    Direction, Event, EventKind, FillEvent, MarketEvent, OrderEvent, OrderType, SignalEvent,
    SignalType,
};
pub use ledger::{HoldingsSnapshot, PositionSnapshot};
