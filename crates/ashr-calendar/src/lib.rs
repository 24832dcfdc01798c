//! ashr-calendar
//!
//! A-share trading calendar and market session clock.
//!
//! Pure deterministic logic. No IO besides the optional holiday-file loader,
//! no wall-clock reads: callers pass `now` and dates in explicitly.
//!
//! - [`HolidayTable`]: date → holiday name, built-in for 2024–2025, loadable
//!   from JSON for later years.
//! - [`classify`]: weekday + holiday classification of a single date.
//! - [`complete_month`] / [`complete_range`] / [`complete_year`]: fill gaps in
//!   persisted calendar records.
//! - [`session`]: session phase, next open/close, poll intervals.
//! - [`stats`]: monthly/yearly aggregates and upcoming closures.

mod complete;
mod date;
mod day;
mod holidays;
pub mod session;
pub mod stats;

pub use complete::{complete_month, complete_range, complete_year};
pub use date::{days_in_month, parse_calendar_date, MonthKey};
pub use day::{classify, classify_with, CalendarDay, DaySource, DisplayStatus, StoredDay};
pub use holidays::{HolidayEntry, HolidayKind, HolidayTable};
pub use session::{MarketPhase, MarketStatus};

/// Exchange timezone for SSE / SZSE. China has not observed DST since 1991,
/// but all conversions still go through the tz database.
pub const EXCHANGE_TZ: chrono_tz::Tz = chrono_tz::Asia::Shanghai;

/// Civil date "today" at the exchange for the given instant.
pub fn exchange_date(now: chrono::DateTime<chrono::Utc>) -> chrono::NaiveDate {
    now.with_timezone(&EXCHANGE_TZ).date_naive()
}
