//! Clock abstraction
//!
//! Readings that arrive without a timestamp are stamped with the engine
//! clock's current time. Production uses the system clock; tests pin time
//! with [`FixedClock`] so windows and ordering are reproducible.

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock time for the engine
pub trait Clock {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests
#[derive(Debug, Clone)]
pub struct FixedClock {
    current: Cell<DateTime<Utc>>,
}

impl FixedClock {
    /// Create pinned at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Cell::new(start),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, timestamp: DateTime<Utc>) {
        self.current.set(timestamp);
    }

    /// Move forward by `ms` milliseconds
    pub fn advance_ms(&self, ms: i64) {
        self.current
            .set(self.current.get() + Duration::milliseconds(ms));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.current.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance_ms(1500);
        assert_eq!(clock.now(), start + Duration::milliseconds(1500));
    }

    #[test]
    fn system_clock_is_monotone_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
