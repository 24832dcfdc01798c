//! Calendar completion scenarios: synthesized months and persisted overrides.

use ashr_calendar::*;
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn empty_records_give_one_day_per_date_ascending() {
    let table = HolidayTable::builtin();
    for (y, m) in [(2024, 1), (2024, 2), (2025, 2), (2024, 4), (2024, 12), (2031, 7)] {
        let month = MonthKey::new(y, m).unwrap();
        let got = complete_month(month, &[], &table);
        assert_eq!(got.len() as u32, days_in_month(y, m), "{month}");
        for w in got.windows(2) {
            assert!(w[0].date < w[1].date, "{month} not strictly ascending");
        }
        for day in &got {
            assert!(month.contains(day.date));
            assert_eq!(*day, classify(day.date, &table));
        }
    }
}

#[test]
fn persisted_special_closure_overrides_classifier() {
    let table = HolidayTable::builtin();
    // 2024-10-15 is an ordinary Tuesday; store it as a special closure.
    let rec = StoredDay::holiday(d(2024, 10, 15), "临时休市");
    let got = complete_month(MonthKey::new(2024, 10).unwrap(), &[rec], &table);

    let day = got.iter().find(|x| x.date == d(2024, 10, 15)).unwrap();
    assert!(!day.is_trade_day);
    assert!(day.is_holiday);
    assert_eq!(day.holiday_name.as_deref(), Some("临时休市"));
    assert_eq!(day.display_status, DisplayStatus::Holiday);
    assert_eq!(day.source, DaySource::Stored);

    // Neighbours remain classifier-derived.
    let next = got.iter().find(|x| x.date == d(2024, 10, 16)).unwrap();
    assert!(next.is_trade_day);
    assert_eq!(next.source, DaySource::Derived);
}

#[test]
fn persisted_trading_flag_beats_holiday_table() {
    let table = HolidayTable::builtin();
    // Table says holiday; the store says it traded. The store wins.
    let rec = StoredDay::new(d(2024, 10, 7), true);
    let got = complete_month(MonthKey::new(2024, 10).unwrap(), &[rec], &table);
    let day = got.iter().find(|x| x.date == d(2024, 10, 7)).unwrap();
    assert!(day.is_trade_day);
    assert!(!day.is_holiday);
    assert_eq!(day.holiday_name, None);
    assert_eq!(day.display_status, DisplayStatus::Trading);
}

#[test]
fn partial_coverage_mixes_sources() {
    let table = HolidayTable::builtin();
    let recs: Vec<StoredDay> = (8..=11).map(|x| StoredDay::new(d(2024, 10, x), true)).collect();
    let got = complete_month(MonthKey::new(2024, 10).unwrap(), &recs, &table);
    assert_eq!(got.len(), 31);
    let stored = got.iter().filter(|x| x.source == DaySource::Stored).count();
    assert_eq!(stored, 4);
    assert_eq!(got[0].display_status, DisplayStatus::Holiday);
}

#[test]
fn timestamp_shaped_stored_dates_still_match() {
    let table = HolidayTable::builtin();
    let date = parse_calendar_date("2024-10-15T00:00:00.000Z").unwrap();
    let rec = StoredDay::new(date, false);
    let got = complete_month(MonthKey::new(2024, 10).unwrap(), &[rec], &table);
    let day = got.iter().find(|x| x.date == d(2024, 10, 15)).unwrap();
    assert_eq!(day.source, DaySource::Stored);
    assert!(!day.is_trade_day);
}

#[test]
fn range_spanning_months_is_contiguous() {
    let table = HolidayTable::builtin();
    let got = complete_range(d(2024, 9, 28), d(2024, 10, 9), &[], &table);
    assert_eq!(got.len(), 12);
    assert_eq!(got.first().unwrap().date, d(2024, 9, 28));
    assert_eq!(got.last().unwrap().date, d(2024, 10, 9));
    let trading: Vec<_> = got.iter().filter(|x| x.is_trade_day).map(|x| x.date).collect();
    assert_eq!(trading, vec![d(2024, 9, 30), d(2024, 10, 8), d(2024, 10, 9)]);
}
