//! Market session clock for SSE / SZSE continuous trading.
//!
//! Sessions (exchange local time, Monday–Friday):
//! - morning   09:30:00 – 11:30:00
//! - afternoon 13:00:00 – 15:00:00
//!
//! Both ends are inclusive to the second: 11:30:00 is still open,
//! 11:30:01 is lunch break. All inputs are UTC instants; conversion to
//! exchange time goes through `chrono-tz`, never a hand-applied offset, so the
//! host timezone has no influence on the result.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::EXCHANGE_TZ;

const MORNING_OPEN: u32 = 9 * 3600 + 30 * 60; //    09:30:00
const MORNING_CLOSE: u32 = 11 * 3600 + 30 * 60; //  11:30:00
const AFTERNOON_OPEN: u32 = 13 * 3600; //           13:00:00
const AFTERNOON_CLOSE: u32 = 15 * 3600; //          15:00:00

/// Upper bound on how far [`next_market_open_on`] searches for a trading
/// date before giving up on the predicate.
const MAX_LOOKAHEAD_DAYS: u32 = 3660;

// ---------------------------------------------------------------------------
// Phase / status
// ---------------------------------------------------------------------------

/// Fine-grained session phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarketPhase {
    PreMarket,
    MorningSession,
    LunchBreak,
    AfternoonSession,
    Closed,
}

/// Coarse status used for polling decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Open,
    Break,
    Closed,
}

impl MarketPhase {
    /// Pre-market folds into `Closed`.
    pub fn status(self) -> MarketStatus {
        match self {
            MarketPhase::MorningSession | MarketPhase::AfternoonSession => MarketStatus::Open,
            MarketPhase::LunchBreak => MarketStatus::Break,
            MarketPhase::PreMarket | MarketPhase::Closed => MarketStatus::Closed,
        }
    }

    pub fn label(self, is_trade_day: bool) -> &'static str {
        match self {
            MarketPhase::PreMarket => "等待开市",
            MarketPhase::MorningSession => "上午交易中",
            MarketPhase::LunchBreak => "午间休市",
            MarketPhase::AfternoonSession => "下午交易中",
            MarketPhase::Closed if is_trade_day => "已收市",
            MarketPhase::Closed => "休市",
        }
    }
}

impl MarketStatus {
    pub fn label(self) -> &'static str {
        match self {
            MarketStatus::Open => "开市中",
            MarketStatus::Break => "午休",
            MarketStatus::Closed => "闭市",
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Session phase at `now` given whether the exchange-local date trades.
pub fn session_phase(now: DateTime<Utc>, is_trade_day: bool) -> MarketPhase {
    if !is_trade_day {
        return MarketPhase::Closed;
    }
    let t = LocalClock::of(now);
    if !t.at_or_after(MORNING_OPEN) {
        MarketPhase::PreMarket
    } else if t.at_or_before(MORNING_CLOSE) {
        MarketPhase::MorningSession
    } else if !t.at_or_after(AFTERNOON_OPEN) {
        MarketPhase::LunchBreak
    } else if t.at_or_before(AFTERNOON_CLOSE) {
        MarketPhase::AfternoonSession
    } else {
        MarketPhase::Closed
    }
}

/// Weekday-only status (no holiday knowledge).
pub fn market_status(now: DateTime<Utc>) -> MarketStatus {
    let date = crate::exchange_date(now);
    session_phase(now, is_weekday(date)).status()
}

pub fn is_market_open(now: DateTime<Utc>) -> bool {
    market_status(now) == MarketStatus::Open
}

// ---------------------------------------------------------------------------
// Next open / close
// ---------------------------------------------------------------------------

/// Next session start on a weekday. Returns `now` while a session is open.
pub fn next_market_open(now: DateTime<Utc>) -> DateTime<Utc> {
    next_market_open_on(now, is_weekday)
}

/// Like [`next_market_open`] but only dates accepted by `is_trading_date`
/// can host the next session, so holidays are skipped.
pub fn next_market_open_on<F>(now: DateTime<Utc>, is_trading_date: F) -> DateTime<Utc>
where
    F: Fn(NaiveDate) -> bool,
{
    let t = LocalClock::of(now);
    let today = t.date;

    if is_trading_date(today) {
        match session_phase(now, true) {
            MarketPhase::PreMarket => return exchange_instant(today, MORNING_OPEN),
            MarketPhase::LunchBreak => return exchange_instant(today, AFTERNOON_OPEN),
            MarketPhase::MorningSession | MarketPhase::AfternoonSession => return now,
            MarketPhase::Closed => {}
        }
    }

    let mut day = today;
    for _ in 0..MAX_LOOKAHEAD_DAYS {
        day = day.succ_opt().unwrap_or(day);
        if is_trading_date(day) {
            return exchange_instant(day, MORNING_OPEN);
        }
    }
    // Predicate rejected ten years of dates; fall back to weekday rules.
    next_market_open(now)
}

/// End of the session currently in progress, or `None` outside sessions.
pub fn next_market_close(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let t = LocalClock::of(now);
    match session_phase(now, is_weekday(t.date)) {
        MarketPhase::MorningSession => Some(exchange_instant(t.date, MORNING_CLOSE)),
        MarketPhase::AfternoonSession => Some(exchange_instant(t.date, AFTERNOON_CLOSE)),
        _ => None,
    }
}

pub fn time_until_next_open(now: DateTime<Utc>) -> Duration {
    (next_market_open(now) - now).max(Duration::zero())
}

/// Zero when no session is in progress.
pub fn time_until_next_close(now: DateTime<Utc>) -> Duration {
    next_market_close(now)
        .map(|close| (close - now).max(Duration::zero()))
        .unwrap_or_else(Duration::zero)
}

/// Recommended polling interval per status.
pub fn update_interval(status: MarketStatus) -> std::time::Duration {
    match status {
        MarketStatus::Open => std::time::Duration::from_millis(90_000),
        MarketStatus::Break => std::time::Duration::from_millis(300_000),
        MarketStatus::Closed => std::time::Duration::from_millis(3_600_000),
    }
}

/// UTC instant of `second_of_day` on `date` in exchange time.
pub fn exchange_instant(date: NaiveDate, second_of_day: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_num_seconds_from_midnight_opt(second_of_day, 0).unwrap_or_default();
    let local = date.and_time(time);
    EXCHANGE_TZ
        .from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&(local - Duration::hours(8))))
}

// ---------------------------------------------------------------------------
// Exchange-local wall clock
// ---------------------------------------------------------------------------

struct LocalClock {
    date: NaiveDate,
    second: u32,
    has_fraction: bool,
}

impl LocalClock {
    fn of(now: DateTime<Utc>) -> Self {
        let local = now.with_timezone(&EXCHANGE_TZ);
        Self {
            date: local.date_naive(),
            second: local.num_seconds_from_midnight(),
            has_fraction: local.nanosecond() > 0,
        }
    }

    fn at_or_after(&self, second_of_day: u32) -> bool {
        self.second >= second_of_day
    }

    fn at_or_before(&self, second_of_day: u32) -> bool {
        self.second < second_of_day || (self.second == second_of_day && !self.has_fraction)
    }
}
