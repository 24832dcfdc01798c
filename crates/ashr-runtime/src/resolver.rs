//! Latest-trading-date resolver.
//!
//! Answers "which date's market data should be shown right now" with a
//! priority chain:
//!
//! 1. today, if the persisted calendar says it trades;
//! 2. the most recent persisted trading day before today;
//! 3. the newest `daily_quote.trade_date`;
//! 4. a "data pending" placeholder for today.
//!
//! Every store error is logged and falls through to the next step, so
//! [`LatestTradingDateResolver::resolve`] is infallible. Results are cached
//! for a TTL measured on the injected [`Clock`].

use ashr_calendar::exchange_date;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::store::{CalendarStore, QuoteStore};

/// Default resolver cache lifetime.
pub const DEFAULT_CACHE_TTL_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingDateInfo {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_trade_day: bool,
    pub display_text: String,
    pub days_ago: i64,
}

impl TradingDateInfo {
    /// Placeholder used when nothing is resolvable.
    pub fn pending(today: NaiveDate) -> Self {
        Self {
            date: today,
            is_today: true,
            is_trade_day: false,
            display_text: "data pending".to_string(),
            days_ago: 0,
        }
    }

    /// Short badge for dashboards.
    pub fn badge_text(&self) -> String {
        if self.is_today && self.is_trade_day {
            "今日实时数据".to_string()
        } else if self.is_today {
            "今日非交易日，显示最近交易日数据".to_string()
        } else if self.days_ago == 1 {
            "昨日交易数据".to_string()
        } else {
            format!("{}个交易日前数据", self.days_ago)
        }
    }
}

fn calendar_text(days_ago: i64) -> String {
    match days_ago {
        1 => "yesterday's data".to_string(),
        n if n <= 3 => format!("{n} days ago"),
        _ => "most recent trading-day data".to_string(),
    }
}

fn quote_text(days_ago: i64) -> String {
    match days_ago {
        0 => "today's data".to_string(),
        1 => "yesterday's data".to_string(),
        n => format!("{n} days ago"),
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Single-slot TTL cache. Last write wins.
#[derive(Debug)]
pub struct TradingDateCache {
    ttl: Duration,
    slot: Mutex<Option<(DateTime<Utc>, TradingDateInfo)>>,
}

impl TradingDateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value if stored within the TTL before `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<TradingDateInfo> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some((stored_at, info)) if now >= *stored_at && now - *stored_at < self.ttl => {
                Some(info.clone())
            }
            _ => None,
        }
    }

    pub fn put(&self, now: DateTime<Utc>, info: TradingDateInfo) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some((now, info));
    }

    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl Default for TradingDateCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_CACHE_TTL_SECS))
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

pub struct LatestTradingDateResolver {
    calendar: Arc<dyn CalendarStore>,
    quotes: Arc<dyn QuoteStore>,
    clock: Arc<dyn Clock>,
    cache: TradingDateCache,
}

impl LatestTradingDateResolver {
    pub fn new(
        calendar: Arc<dyn CalendarStore>,
        quotes: Arc<dyn QuoteStore>,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            calendar,
            quotes,
            clock,
            cache: TradingDateCache::new(cache_ttl),
        }
    }

    /// Cached answer when fresh, otherwise [`Self::resolve_fresh`].
    pub async fn resolve(&self) -> TradingDateInfo {
        let now = self.clock.now();
        if let Some(hit) = self.cache.get(now) {
            return hit;
        }
        let info = self.resolve_at(now).await;
        self.cache.put(now, info.clone());
        info
    }

    /// Walk the chain without consulting the cache; refreshes it.
    pub async fn resolve_fresh(&self) -> TradingDateInfo {
        let now = self.clock.now();
        let info = self.resolve_at(now).await;
        self.cache.put(now, info.clone());
        info
    }

    pub fn invalidate(&self) {
        self.cache.clear();
    }

    async fn resolve_at(&self, now: DateTime<Utc>) -> TradingDateInfo {
        let today = exchange_date(now);

        // 1. today
        match self.calendar.calendar_day(today).await {
            Ok(Some(row)) if row.is_trade_day => {
                return TradingDateInfo {
                    date: today,
                    is_today: true,
                    is_trade_day: true,
                    display_text: "today's real-time data".to_string(),
                    days_ago: 0,
                };
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(%today, error = %err, "resolver: today lookup failed"),
        }

        // 2. most recent trading day before today
        match self.calendar.latest_trade_day_before(today).await {
            Ok(Some(date)) => {
                let days_ago = (today - date).num_days().max(0);
                return TradingDateInfo {
                    date,
                    is_today: false,
                    is_trade_day: false,
                    display_text: calendar_text(days_ago),
                    days_ago,
                };
            }
            Ok(None) => tracing::debug!(%today, "resolver: no persisted trading day before today"),
            Err(err) => tracing::warn!(%today, error = %err, "resolver: calendar lookup failed"),
        }

        // 3. newest quote date
        match self.quotes.latest_quote_date().await {
            Ok(Some(date)) => {
                let days_ago = (today - date).num_days().max(0);
                let is_today = days_ago == 0;
                return TradingDateInfo {
                    date,
                    is_today,
                    is_trade_day: is_today,
                    display_text: quote_text(days_ago),
                    days_ago,
                };
            }
            Ok(None) => tracing::debug!("resolver: quote table is empty"),
            Err(err) => tracing::warn!(error = %err, "resolver: quote lookup failed"),
        }

        // 4. placeholder
        TradingDateInfo::pending(today)
    }
}
