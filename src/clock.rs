//! Monotonic microsecond clock capability.
//!
//! Tables fall back to the clock for their end time when they hold no samples,
//! and hosts use the same clock to timestamp samples and drive frame ticks.

use std::cell::Cell;
use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;

/// Microseconds per second.
pub const USEC_PER_SEC: i64 = 1_000_000;

/// A monotonic clock reporting microseconds.
pub trait Clock: fmt::Debug {
    /// Current reading in microseconds. Never decreases.
    fn now_us(&self) -> i64;
}

/// Process-wide monotonic clock, counting from the first reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    /// Create the clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> i64 {
        static EPOCH: OnceLock<Instant> = OnceLock::new();
        let epoch = EPOCH.get_or_init(Instant::now);
        i64::try_from(epoch.elapsed().as_micros()).unwrap_or(i64::MAX)
    }
}

/// Clock that only moves when told to. Used for deterministic tests and
/// replaying recorded samples.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    /// Create a clock reading `start_us`.
    #[must_use]
    pub fn new(start_us: i64) -> Self {
        Self {
            now: Cell::new(start_us),
        }
    }

    /// Set the reading.
    pub fn set(&self, now_us: i64) {
        self.now.set(now_us);
    }

    /// Move forward by `delta_us`.
    pub fn advance(&self, delta_us: i64) {
        self.now.set(self.now.get().saturating_add(delta_us));
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> i64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_never_decreases() {
        let clock = MonotonicClock::new();
        let a = clock.now_us();
        let b = clock.now_us();
        assert!(b >= a);
        assert!(a >= 0);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10);
        assert_eq!(clock.now_us(), 10);
        clock.advance(5 * USEC_PER_SEC);
        assert_eq!(clock.now_us(), 5_000_010);
        clock.set(3);
        assert_eq!(clock.now_us(), 3);
    }
}
