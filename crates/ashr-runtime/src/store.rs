//! Store seams for the persisted calendar and the quote table.
//!
//! The calendar service and the resolver only ever see these traits. Errors
//! are plain `anyhow` and are always caught by the callers, which degrade
//! instead of failing.

use anyhow::{anyhow, Result};
use ashr_calendar::StoredDay;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Rows in `[start, end]`, ascending.
    async fn calendar_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StoredDay>>;

    async fn calendar_day(&self, date: NaiveDate) -> Result<Option<StoredDay>>;

    /// Most recent trading day strictly before `date`.
    async fn latest_trade_day_before(&self, date: NaiveDate) -> Result<Option<NaiveDate>>;

    /// Newest `limit` rows, descending.
    async fn recent_days(&self, limit: u32) -> Result<Vec<StoredDay>>;
}

#[async_trait]
pub trait QuoteStore: Send + Sync {
    async fn latest_quote_date(&self) -> Result<Option<NaiveDate>>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CalendarStore for PgStore {
    async fn calendar_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StoredDay>> {
        ashr_db::fetch_calendar_range(&self.pool, start, end).await
    }

    async fn calendar_day(&self, date: NaiveDate) -> Result<Option<StoredDay>> {
        ashr_db::fetch_calendar_day(&self.pool, date).await
    }

    async fn latest_trade_day_before(&self, date: NaiveDate) -> Result<Option<NaiveDate>> {
        ashr_db::latest_trade_day_before(&self.pool, date).await
    }

    async fn recent_days(&self, limit: u32) -> Result<Vec<StoredDay>> {
        ashr_db::recent_calendar_days(&self.pool, limit).await
    }
}

#[async_trait]
impl QuoteStore for PgStore {
    async fn latest_quote_date(&self) -> Result<Option<NaiveDate>> {
        ashr_db::latest_quote_date(&self.pool).await
    }
}

// ---------------------------------------------------------------------------
// No database configured
// ---------------------------------------------------------------------------

/// Store used when no database is configured. Every call fails, so callers
/// take their degraded path (classifier-only calendar, placeholder date).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

const UNAVAILABLE: &str = "calendar store not configured";

#[async_trait]
impl CalendarStore for UnavailableStore {
    async fn calendar_range(&self, _start: NaiveDate, _end: NaiveDate) -> Result<Vec<StoredDay>> {
        Err(anyhow!(UNAVAILABLE))
    }

    async fn calendar_day(&self, _date: NaiveDate) -> Result<Option<StoredDay>> {
        Err(anyhow!(UNAVAILABLE))
    }

    async fn latest_trade_day_before(&self, _date: NaiveDate) -> Result<Option<NaiveDate>> {
        Err(anyhow!(UNAVAILABLE))
    }

    async fn recent_days(&self, _limit: u32) -> Result<Vec<StoredDay>> {
        Err(anyhow!(UNAVAILABLE))
    }
}

#[async_trait]
impl QuoteStore for UnavailableStore {
    async fn latest_quote_date(&self) -> Result<Option<NaiveDate>> {
        Err(anyhow!(UNAVAILABLE))
    }
}

// ---------------------------------------------------------------------------
// In-memory (testkit)
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "testkit"))]
pub use memory::MemoryStore;

#[cfg(any(test, feature = "testkit"))]
mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Map-backed store with a failure switch and a call counter.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        days: Mutex<BTreeMap<NaiveDate, StoredDay>>,
        quote_date: Mutex<Option<NaiveDate>>,
        calendar_fails: AtomicBool,
        quotes_fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_days<I: IntoIterator<Item = StoredDay>>(days: I) -> Self {
            let s = Self::default();
            for d in days {
                s.put_day(d);
            }
            s
        }

        pub fn put_day(&self, day: StoredDay) {
            self.days
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(day.date, day);
        }

        pub fn set_quote_date(&self, date: Option<NaiveDate>) {
            *self.quote_date.lock().unwrap_or_else(|e| e.into_inner()) = date;
        }

        pub fn fail_calendar(&self, fail: bool) {
            self.calendar_fails.store(fail, Ordering::SeqCst);
        }

        pub fn fail_quotes(&self, fail: bool) {
            self.quotes_fail.store(fail, Ordering::SeqCst);
        }

        /// Total store calls observed, successful or not.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn enter_calendar(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<NaiveDate, StoredDay>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.calendar_fails.load(Ordering::SeqCst) {
                return Err(anyhow!("memory calendar store: injected failure"));
            }
            Ok(self.days.lock().unwrap_or_else(|e| e.into_inner()))
        }
    }

    #[async_trait]
    impl CalendarStore for MemoryStore {
        async fn calendar_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StoredDay>> {
            let days = self.enter_calendar()?;
            if start > end {
                return Ok(Vec::new());
            }
            Ok(days.range(start..=end).map(|(_, d)| d.clone()).collect())
        }

        async fn calendar_day(&self, date: NaiveDate) -> Result<Option<StoredDay>> {
            let days = self.enter_calendar()?;
            Ok(days.get(&date).cloned())
        }

        async fn latest_trade_day_before(&self, date: NaiveDate) -> Result<Option<NaiveDate>> {
            let days = self.enter_calendar()?;
            Ok(days
                .range(..date)
                .rev()
                .find(|(_, d)| d.is_trade_day)
                .map(|(k, _)| *k))
        }

        async fn recent_days(&self, limit: u32) -> Result<Vec<StoredDay>> {
            let days = self.enter_calendar()?;
            Ok(days.values().rev().take(limit as usize).cloned().collect())
        }
    }

    #[async_trait]
    impl QuoteStore for MemoryStore {
        async fn latest_quote_date(&self) -> Result<Option<NaiveDate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.quotes_fail.load(Ordering::SeqCst) {
                return Err(anyhow!("memory quote store: injected failure"));
            }
            Ok(*self.quote_date.lock().unwrap_or_else(|e| e.into_inner()))
        }
    }
}
