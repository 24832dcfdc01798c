//! Store-backed calendar service.
//!
//! Wraps the pure completion functions with a [`CalendarStore`]. Store
//! failures and empty results are logged and degrade to a calendar
//! synthesized from the holiday table; availability never surfaces as an
//! error here. The only errors are caller mistakes (inverted or oversized
//! ranges).

use anyhow::{bail, Result};
use ashr_calendar::session::{market_status, MarketStatus};
use ashr_calendar::stats::{calendar_stats, CalendarStats};
use ashr_calendar::{
    classify, complete_month, complete_range, complete_year, CalendarDay, HolidayTable, MonthKey,
    StoredDay,
};
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

use crate::clock::Clock;
use crate::store::CalendarStore;

/// Widest span accepted by [`CalendarService::range`], in days.
pub const MAX_RANGE_DAYS: i64 = 3660;

/// Upper bound for [`CalendarService::recent`].
pub const MAX_RECENT_LIMIT: u32 = 366;

#[derive(Clone)]
pub struct CalendarService {
    store: Arc<dyn CalendarStore>,
    holidays: Arc<HolidayTable>,
    clock: Arc<dyn Clock>,
}

impl CalendarService {
    pub fn new(
        store: Arc<dyn CalendarStore>,
        holidays: Arc<HolidayTable>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            holidays,
            clock,
        }
    }

    pub fn holidays(&self) -> &HolidayTable {
        &self.holidays
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Persisted rows for the span, or nothing when the store is down.
    async fn persisted(&self, start: NaiveDate, end: NaiveDate) -> Vec<StoredDay> {
        match self.store.calendar_range(start, end).await {
            Ok(rows) => {
                if rows.is_empty() {
                    tracing::debug!(%start, %end, "no persisted calendar rows; synthesizing");
                }
                rows
            }
            Err(err) => {
                tracing::warn!(%start, %end, error = %err, "calendar store unavailable; synthesizing");
                Vec::new()
            }
        }
    }

    /// One day per date in `[start, end]`, ascending.
    pub async fn range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarDay>> {
        if start > end {
            bail!("start date {start} is after end date {end}");
        }
        let span = (end - start).num_days() + 1;
        if span > MAX_RANGE_DAYS {
            bail!("range of {span} days exceeds the {MAX_RANGE_DAYS}-day limit");
        }
        let rows = self.persisted(start, end).await;
        Ok(complete_range(start, end, &rows, &self.holidays))
    }

    pub async fn month(&self, month: MonthKey) -> Vec<CalendarDay> {
        let rows = self.persisted(month.first_day(), month.last_day()).await;
        complete_month(month, &rows, &self.holidays)
    }

    pub async fn current_month(&self) -> Vec<CalendarDay> {
        self.month(MonthKey::of(self.clock.today())).await
    }

    pub async fn year(&self, year: i32) -> Vec<CalendarDay> {
        let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Vec::new();
        };
        let rows = self.persisted(first, last).await;
        complete_year(year, &rows, &self.holidays)
    }

    /// Newest `limit` calendar rows, descending. Falls back to the last
    /// `limit` synthesized days ending today when the store has nothing.
    pub async fn recent(&self, limit: u32) -> Vec<CalendarDay> {
        let limit = limit.clamp(1, MAX_RECENT_LIMIT);
        match self.store.recent_days(limit).await {
            Ok(rows) if !rows.is_empty() => rows.iter().map(CalendarDay::from_stored).collect(),
            Ok(_) => {
                tracing::debug!(limit, "no persisted calendar rows; synthesizing recent days");
                self.synthesized_recent(limit)
            }
            Err(err) => {
                tracing::warn!(limit, error = %err, "calendar store unavailable; synthesizing recent days");
                self.synthesized_recent(limit)
            }
        }
    }

    fn synthesized_recent(&self, limit: u32) -> Vec<CalendarDay> {
        let today = self.clock.today();
        let start = today - Duration::days(i64::from(limit) - 1);
        let mut days = complete_range(start, today, &[], &self.holidays);
        days.reverse();
        days
    }

    /// Yearly/monthly aggregates plus the next closures after today.
    pub async fn stats(&self, year: i32) -> CalendarStats {
        let days = self.year(year).await;
        calendar_stats(year, &days, self.clock.today())
    }

    /// Persisted flag when present, classifier otherwise.
    pub async fn is_trading_day(&self, date: NaiveDate) -> bool {
        match self.store.calendar_day(date).await {
            Ok(Some(row)) => row.is_trade_day,
            Ok(None) => classify(date, &self.holidays).is_trade_day,
            Err(err) => {
                tracing::warn!(%date, error = %err, "calendar store unavailable; classifying");
                classify(date, &self.holidays).is_trade_day
            }
        }
    }

    /// Today trades and a session is in progress.
    pub async fn should_update_now(&self) -> bool {
        let now = self.clock.now();
        let today = self.clock.today();
        self.is_trading_day(today).await && market_status(now) == MarketStatus::Open
    }
}
