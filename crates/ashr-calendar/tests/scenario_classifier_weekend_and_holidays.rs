//! Classifier scenarios: weekday arithmetic and the holiday table.
//!
//! Reference dates:
//!   2024-01-01 Mon : 元旦 (holiday on a weekday)
//!   2024-10-01..07 : 国庆节 block, Tue..Mon
//!   2025-01-28..02-04: 春节 block
//!   2023-xx, 2030-xx: outside the built-in table

use ashr_calendar::*;
use chrono::{Datelike, NaiveDate, Weekday};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn all_days(year: i32) -> impl Iterator<Item = NaiveDate> {
    d(year, 1, 1).iter_days().take_while(move |x| x.year() == year)
}

#[test]
fn weekend_flag_matches_weekday_for_whole_years() {
    let table = HolidayTable::builtin();
    for year in [2023, 2024, 2025, 2026] {
        for date in all_days(year) {
            let day = classify(date, &table);
            let expect = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
            assert_eq!(day.is_weekend, expect, "{date}");
            assert_eq!(day.weekday, date.weekday().num_days_from_sunday(), "{date}");
            assert_eq!(day.is_trade_day, !day.is_weekend && !day.is_holiday, "{date}");
        }
    }
}

#[test]
fn every_table_entry_is_a_non_trading_holiday() {
    let table = HolidayTable::builtin();
    assert!(!table.is_empty());
    for (date, entry) in table.iter() {
        let day = classify(*date, &table);
        assert!(!day.is_trade_day, "{date}");
        assert!(day.is_holiday, "{date}");
        assert_eq!(day.display_status, DisplayStatus::Holiday, "{date}");
        assert_eq!(day.holiday_name.as_deref(), Some(entry.name.as_str()));
    }
}

#[test]
fn national_day_week_2024_never_trades() {
    let table = HolidayTable::builtin();
    for day in 1..=7 {
        let c = classify(d(2024, 10, day), &table);
        assert!(!c.is_trade_day, "2024-10-{day:02}");
        assert_eq!(c.display_status, DisplayStatus::Holiday);
    }
    // First trading day after the block.
    assert!(classify(d(2024, 10, 8), &table).is_trade_day);
}

#[test]
fn new_year_2024_on_monday_is_holiday() {
    let c = classify(d(2024, 1, 1), &HolidayTable::builtin());
    assert_eq!(c.weekday, 1);
    assert!(!c.is_weekend);
    assert!(!c.is_trade_day);
    assert_eq!(c.holiday_name.as_deref(), Some("元旦"));
}

#[test]
fn uncovered_years_fall_back_to_weekday_rules() {
    let table = HolidayTable::builtin();
    // 2030-10-01 is a Tuesday; no table entry so it classifies as trading.
    let c = classify(d(2030, 10, 1), &table);
    assert!(c.is_trade_day);
    assert_eq!(c.display_status, DisplayStatus::Trading);
}

#[test]
fn holiday_file_extends_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("holidays.json");
    std::fs::write(
        &path,
        r#"{"2030-10-01": {"type": "statutory", "name": "国庆节"}}"#,
    )
    .unwrap();

    let table = HolidayTable::builtin().merged(HolidayTable::load_json_file(&path).unwrap());
    let c = classify(d(2030, 10, 1), &table);
    assert!(!c.is_trade_day);
    assert_eq!(c.status_text, "国庆节休市");
}

#[test]
fn timestamp_shaped_dates_classify_by_civil_date() {
    let table = HolidayTable::builtin();
    // Midnight in UTC+8 is still the previous day in UTC; the civil date wins.
    let date = parse_calendar_date("2024-10-08T00:00:00+08:00").unwrap();
    let c = classify(date, &table);
    assert_eq!(c.date, d(2024, 10, 8));
    assert_eq!(c.weekday, 2);
}
