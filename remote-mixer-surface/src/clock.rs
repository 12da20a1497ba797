use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::Utc;

pub trait Clock {
    /// Monotonic time used for pacing.
    fn now(&self) -> Instant;

    /// Wall-clock seconds since the UNIX epoch, used for message timestamps.
    fn timestamp(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin:  Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { origin:  Instant::now(),
               elapsed: Rc::new(Cell::new(Duration::ZERO)), }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn timestamp(&self) -> f64 {
        self.elapsed.get().as_secs_f64()
    }
}
