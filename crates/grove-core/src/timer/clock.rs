//! Time sources for the session clock.
//!
//! Two readings are needed: a monotonic one for frame-to-frame deltas, which
//! must not jump when the system time is adjusted, and wall-clock epoch
//! milliseconds for the persisted `endAt`/`savedAt` stamps that have to stay
//! meaningful across process restarts.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use chrono::Utc;

pub trait TimeSource {
    /// Milliseconds on a monotonic clock with an arbitrary origin.
    fn monotonic_ms(&self) -> u64;

    /// Wall-clock milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> i64;
}

/// Real clocks: [`Instant`] for deltas, [`Utc::now`] for stamps.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn monotonic_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn epoch_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock. Clones share the same readings.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    monotonic: Rc<Cell<u64>>,
    epoch: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(epoch_ms: i64) -> Self {
        Self {
            monotonic: Rc::new(Cell::new(0)),
            epoch: Rc::new(Cell::new(epoch_ms)),
        }
    }

    /// Move both readings forward.
    pub fn advance(&self, ms: u64) {
        self.monotonic.set(self.monotonic.get().saturating_add(ms));
        self.epoch.set(self.epoch.get().saturating_add(ms as i64));
    }

    /// Shift only the wall clock, as an NTP correction or a user changing
    /// the system time would.
    pub fn shift_wall(&self, delta_ms: i64) {
        self.epoch.set(self.epoch.get().saturating_add(delta_ms));
    }
}

impl TimeSource for ManualClock {
    fn monotonic_ms(&self) -> u64 {
        self.monotonic.get()
    }

    fn epoch_ms(&self) -> i64 {
        self.epoch.get()
    }
}
