//! Calendar date parsing helpers.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

/// Parse a calendar date as stored or supplied by callers.
///
/// Accepts a bare `YYYY-MM-DD` as well as full timestamps
/// (`2024-10-08T00:00:00Z`, `2024-10-08T00:00:00+08:00`,
/// `2024-10-08 00:00:00`). For timestamps the civil date as written is used,
/// never a timezone-shifted one: `2024-10-08T00:00:00+08:00` is 2024-10-08.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    Err(anyhow!("invalid calendar date '{}'. expected YYYY-MM-DD", raw))
}

/// Number of days in the given month. Returns 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map(|n| (n - first).num_days() as u32).unwrap_or(31)
}

/// A `YYYY-MM` month key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("invalid month {month}: expected 1..=12");
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            bail!("year {year} out of range");
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let n = days_in_month(self.year, self.month);
        NaiveDate::from_ymd_opt(self.year, self.month, n).unwrap_or(NaiveDate::MIN)
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for MonthKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (y, m) = s
            .split_once('-')
            .with_context(|| format!("invalid month '{s}'. expected YYYY-MM"))?;
        if y.len() != 4 || m.is_empty() || m.len() > 2 {
            bail!("invalid month '{s}'. expected YYYY-MM");
        }
        let year: i32 = y
            .parse()
            .with_context(|| format!("invalid year in month '{s}'"))?;
        let month: u32 = m
            .parse()
            .with_context(|| format!("invalid month number in '{s}'"))?;
        MonthKey::new(year, month)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_bare_and_timestamp_dates() {
        assert_eq!(parse_calendar_date("2024-10-08").unwrap(), d(2024, 10, 8));
        assert_eq!(
            parse_calendar_date("2024-10-08T00:00:00.000Z").unwrap(),
            d(2024, 10, 8)
        );
        assert_eq!(
            parse_calendar_date("2024-10-08T00:00:00+08:00").unwrap(),
            d(2024, 10, 8)
        );
        assert_eq!(
            parse_calendar_date("2024-10-08 15:00:00").unwrap(),
            d(2024, 10, 8)
        );
        assert!(parse_calendar_date("2024/10/08").is_err());
        assert!(parse_calendar_date("2024-02-30").is_err());
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn month_key_parse_and_display() {
        let m: MonthKey = "2024-06".parse().unwrap();
        assert_eq!(m, MonthKey { year: 2024, month: 6 });
        assert_eq!(m.to_string(), "2024-06");
        assert_eq!("2024-6".parse::<MonthKey>().unwrap().month, 6);
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("24-01".parse::<MonthKey>().is_err());
        assert!("2024".parse::<MonthKey>().is_err());
        assert_eq!(m.first_day(), d(2024, 6, 1));
        assert_eq!(m.last_day(), d(2024, 6, 30));
    }
}
