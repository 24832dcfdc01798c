//! Calendar completion: persisted records + synthesized gaps.
//!
//! Output always has exactly one [`CalendarDay`] per civil date in the
//! requested span, ascending. Persisted records are matched on their civil
//! date and trusted verbatim; every other day goes through the classifier
//! with one batched holiday lookup for the whole span.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

use crate::date::MonthKey;
use crate::day::{classify_with, CalendarDay, StoredDay};
use crate::holidays::HolidayTable;

/// Complete a single month.
pub fn complete_month(
    month: MonthKey,
    persisted: &[StoredDay],
    holidays: &HolidayTable,
) -> Vec<CalendarDay> {
    complete_range(month.first_day(), month.last_day(), persisted, holidays)
}

/// Complete every month of `year`.
pub fn complete_year(year: i32, persisted: &[StoredDay], holidays: &HolidayTable) -> Vec<CalendarDay> {
    let (Some(first), Some(last)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return Vec::new();
    };
    complete_range(first, last, persisted, holidays)
}

/// Complete the inclusive span `[start, end]`. Empty when `start > end`.
pub fn complete_range(
    start: NaiveDate,
    end: NaiveDate,
    persisted: &[StoredDay],
    holidays: &HolidayTable,
) -> Vec<CalendarDay> {
    if start > end {
        return Vec::new();
    }

    // Later records win on duplicate dates, same as a last-write upsert.
    let stored: HashMap<NaiveDate, &StoredDay> = persisted
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .map(|r| (r.date, r))
        .collect();

    let days: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();

    let unmatched: BTreeSet<NaiveDate> = days
        .iter()
        .filter(|d| !stored.contains_key(d))
        .copied()
        .collect();
    let mut names = holidays.lookup_many(unmatched.iter());

    days.into_iter()
        .map(|date| match stored.get(&date) {
            Some(rec) => CalendarDay::from_stored(rec),
            None => classify_with(date, names.remove(&date).flatten()),
        })
        .collect()
}
