//! Time sources for the trust engine.

use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;

use dabac_core::traits::Clock;
use dabac_core::types::Timestamp;

fn wall_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Wall clock: seconds since the Unix epoch with microsecond resolution.
///
/// Not monotonic. An NTP step backwards makes every read and write of a
/// subject updated after the stepped-back instant fail with a causality
/// violation until the clock catches up. Use [`MonotonicClock`] for a
/// long-running engine; this one suits records shared across processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(wall_secs())
    }
}

/// Monotonic clock anchored to the wall time at construction.
///
/// Readings are `anchor + elapsed`, where `elapsed` comes from
/// [`Instant`], so they never move backwards within one process even if the
/// system clock is stepped.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor_secs: f64,
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::anchored_at(Timestamp::from_secs(wall_secs()))
    }

    /// Clock whose first reading is `anchor`.
    pub fn anchored_at(anchor: Timestamp) -> Self {
        Self {
            anchor_secs: anchor.as_secs(),
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.anchor_secs + self.origin.elapsed().as_secs_f64())
    }
}

/// Manually driven clock for simulations and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward (or backward, for a negative `secs`).
    pub fn advance(&self, secs: f64) {
        let mut now = self.now.lock();
        *now = now.plus_secs(secs);
    }

    pub fn set(&self, at: Timestamp) {
        *self.now.lock() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
