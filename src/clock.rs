// src/clock.rs

//! Monotonic time for the simulation tick.
//!
//! The engine's time base is advanced by measured wall time, not by the
//! nominal tick period, so scheduling jitter never skews its timers.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time, measured from an arbitrary fixed origin.
pub trait MonotonicClock {
    fn now(&self) -> Duration;

    /// Blocks the caller for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by [`Instant`].
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    /// Sleeping just moves time forward.
    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Whole milliseconds elapsed between ticks.
///
/// Sub-millisecond remainders carry over to the next measurement, so the sum
/// of reported milliseconds never drifts from the clock.
#[derive(Debug, Clone, Copy)]
pub struct TickTimer {
    last: Duration,
}

impl TickTimer {
    pub fn new(now: Duration) -> Self {
        Self { last: now }
    }

    pub fn elapsed_ms(&mut self, now: Duration) -> u32 {
        let delta = now.saturating_sub(self.last);
        let ms = u32::try_from(delta.as_millis()).unwrap_or(u32::MAX);
        self.last += Duration::from_millis(u64::from(ms));
        ms
    }
}
