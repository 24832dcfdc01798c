//! Command handler modules for ashr-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod calendar;
pub mod db;
pub mod market;

use anyhow::{Context, Result};
use ashr_calendar::{DisplayStatus, HolidayTable};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Built-in holiday table, overlaid with `--holiday-file` when given.
pub fn load_holidays(holiday_file: Option<&str>) -> Result<HolidayTable> {
    let builtin = HolidayTable::builtin();
    match holiday_file {
        None => Ok(builtin),
        Some(path) => {
            let extra = HolidayTable::load_json_file(path)
                .with_context(|| format!("read --holiday-file failed: {}", path))?;
            Ok(builtin.merged(extra))
        }
    }
}

/// Parse `--at`: RFC 3339, or `YYYY-MM-DD HH:MM:SS` read as exchange-local.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let local = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").with_context(|| {
        format!(
            "invalid --at '{}'. expected RFC 3339 or 'YYYY-MM-DD HH:MM:SS'",
            raw
        )
    })?;
    ashr_calendar::EXCHANGE_TZ
        .from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("--at '{}' does not exist in exchange time", raw))
}

pub fn display_status_name(s: DisplayStatus) -> &'static str {
    match s {
        DisplayStatus::Trading => "trading",
        DisplayStatus::Holiday => "holiday",
        DisplayStatus::Weekend => "weekend",
    }
}
