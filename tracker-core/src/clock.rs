//! Timestamp sources.

use chrono::{DateTime, Utc};
use std::cell::Cell;

/// Source of "now" for action timestamps and `updated_at`.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wraps another clock so successive readings never go backwards, even when
/// the wall clock jumps.
#[derive(Debug, Default)]
pub struct MonotonicClock<C = SystemClock> {
    inner: C,
    last: Cell<Option<DateTime<Utc>>>,
}

impl<C: Clock> MonotonicClock<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            last: Cell::new(None),
        }
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&self) -> DateTime<Utc> {
        let reading = self.inner.now();
        let now = match self.last.get() {
            Some(last) if last > reading => last,
            _ => reading,
        };
        self.last.set(Some(now));
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;

    #[test]
    fn test_monotonic_clock_holds_through_backwards_jump() {
        let manual = ManualClock::default();
        let clock = MonotonicClock::new(manual.clone());

        let first = clock.now();
        manual.advance_secs(-60);
        assert_eq!(clock.now(), first);

        manual.advance_secs(120);
        assert!(clock.now() > first);
    }
}
