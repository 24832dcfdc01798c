//! Wall-clock seam.
//!
//! Everything in this crate that needs "now" asks a [`Clock`]; nothing reads
//! `Utc::now()` directly, so the resolver cache and the market timer can be
//! driven deterministically in tests.

use ashr_calendar::exchange_date;
use chrono::{DateTime, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Exchange-local civil date of [`Clock::now`].
    fn today(&self) -> NaiveDate {
        exchange_date(self.now())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "testkit"))]
pub use testkit::{ManualClock, PausedClock};

#[cfg(any(test, feature = "testkit"))]
mod testkit {
    use super::Clock;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
        }

        pub fn advance(&self, by: chrono::Duration) {
            let mut g = self.now.lock().unwrap_or_else(|e| e.into_inner());
            *g += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    /// Wall clock anchored at `base` that advances with tokio's clock, so it
    /// follows `tokio::time::pause` / auto-advance in paused-time tests.
    #[derive(Debug)]
    pub struct PausedClock {
        base: DateTime<Utc>,
        start: tokio::time::Instant,
    }

    impl PausedClock {
        pub fn starting_at(base: DateTime<Utc>) -> Self {
            Self {
                base,
                start: tokio::time::Instant::now(),
            }
        }
    }

    impl Clock for PausedClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = tokio::time::Instant::now().duration_since(self.start);
            let elapsed = chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
            self.base + elapsed
        }
    }
}
