//! Ledger clock: the only source of "now" for wallet timestamps.
//!
//! Ledger functions take the timestamp as an argument; the facade reads
//! it from a `LedgerClock` so tests can pin time.

use crate::types::Timestamp;
use std::cell::Cell;

/// `Send` so a ledger can be handed to its writer thread.
pub trait LedgerClock: Send {
    /// Current time in Unix epoch milliseconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl LedgerClock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A hand-driven clock. Each read returns the current value and then
/// advances by `step` milliseconds, so successive records get distinct,
/// increasing timestamps.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Cell<Timestamp>,
    step:    Timestamp,
}

impl ManualClock {
    pub fn new(start: Timestamp, step: Timestamp) -> Self {
        Self { current: Cell::new(start), step }
    }

}

impl LedgerClock for ManualClock {
    fn now(&self) -> Timestamp {
        let t = self.current.get();
        self.current.set(t + self.step);
        t
    }
}
