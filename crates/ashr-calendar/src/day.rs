//! Trading-day classification.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::holidays::HolidayTable;

const WEEKDAY_TEXT: [&str; 7] = ["周日", "周一", "周二", "周三", "周四", "周五", "周六"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Trading,
    Holiday,
    Weekend,
}

/// Where a [`CalendarDay`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaySource {
    /// Persisted trade-calendar record (authoritative).
    Stored,
    /// Synthesized from weekday arithmetic and the holiday table.
    Derived,
}

/// A persisted trade-calendar row as the store hands it back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDay {
    pub date: NaiveDate,
    pub is_trade_day: bool,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
}

impl StoredDay {
    pub fn new(date: NaiveDate, is_trade_day: bool) -> Self {
        Self {
            date,
            is_trade_day,
            is_holiday: false,
            holiday_name: None,
        }
    }

    pub fn holiday(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            is_trade_day: false,
            is_holiday: true,
            holiday_name: Some(name.into()),
        }
    }
}

/// Fully classified calendar day. Computed on demand, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// 0 = Sunday .. 6 = Saturday.
    pub weekday: u32,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub is_trade_day: bool,
    pub display_status: DisplayStatus,
    pub status_text: String,
    pub weekday_text: String,
    pub source: DaySource,
}

/// Classify `date` from weekday arithmetic and the holiday table.
pub fn classify(date: NaiveDate, holidays: &HolidayTable) -> CalendarDay {
    classify_with(date, holidays.lookup(date).map(str::to_string))
}

/// Classify `date` given an already looked-up holiday name.
pub fn classify_with(date: NaiveDate, holiday_name: Option<String>) -> CalendarDay {
    let weekday = date.weekday().num_days_from_sunday();
    let is_weekend = weekday == 0 || weekday == 6;
    let is_holiday = holiday_name.is_some();
    let is_trade_day = !is_weekend && !is_holiday;

    let display_status = if is_holiday {
        DisplayStatus::Holiday
    } else if is_weekend {
        DisplayStatus::Weekend
    } else {
        DisplayStatus::Trading
    };

    build(
        date,
        weekday,
        is_weekend,
        is_holiday,
        holiday_name,
        is_trade_day,
        display_status,
        DaySource::Derived,
    )
}

impl CalendarDay {
    /// Map a persisted record verbatim: its trade-day / holiday flags win
    /// over anything the weekday or holiday table would say.
    pub fn from_stored(rec: &StoredDay) -> Self {
        let weekday = rec.date.weekday().num_days_from_sunday();
        let is_weekend = weekday == 0 || weekday == 6;

        let display_status = if rec.is_holiday {
            DisplayStatus::Holiday
        } else if rec.is_trade_day {
            DisplayStatus::Trading
        } else if is_weekend {
            DisplayStatus::Weekend
        } else {
            // Non-trading weekday without a holiday flag: exchange closure.
            DisplayStatus::Holiday
        };

        build(
            rec.date,
            weekday,
            is_weekend,
            rec.is_holiday,
            rec.holiday_name.clone(),
            rec.is_trade_day,
            display_status,
            DaySource::Stored,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn build(
    date: NaiveDate,
    weekday: u32,
    is_weekend: bool,
    is_holiday: bool,
    holiday_name: Option<String>,
    is_trade_day: bool,
    display_status: DisplayStatus,
    source: DaySource,
) -> CalendarDay {
    let status_text = status_text(display_status, holiday_name.as_deref());
    CalendarDay {
        date,
        weekday,
        is_weekend,
        is_holiday,
        holiday_name,
        is_trade_day,
        display_status,
        status_text,
        weekday_text: WEEKDAY_TEXT[weekday as usize % 7].to_string(),
        source,
    }
}

fn status_text(status: DisplayStatus, holiday_name: Option<&str>) -> String {
    match (status, holiday_name) {
        (DisplayStatus::Trading, _) => "交易日".to_string(),
        (DisplayStatus::Holiday, Some(name)) => format!("{name}休市"),
        (DisplayStatus::Holiday, None) => "休市".to_string(),
        (DisplayStatus::Weekend, _) => "周末休市".to_string(),
    }
}
