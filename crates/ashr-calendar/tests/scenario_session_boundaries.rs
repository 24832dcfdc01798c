//! Session clock boundary scenarios.
//!
//! All instants are written as exchange-local wall time (UTC+8) and converted
//! with `session::exchange_instant`, so the assertions do not depend on the
//! host timezone.
//!
//!   2024-01-08 Mon: regular weekday
//!   2024-01-12 Fri: regular weekday
//!   2024-01-13 Sat / 2024-01-14 Sun: weekend
//!   2024-10-01 Tue: 国庆节 (weekday holiday)

use ashr_calendar::session::*;
use ashr_calendar::{HolidayTable, MarketStatus};
use chrono::{DateTime, Duration, NaiveDate, Utc};

fn bj(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    exchange_instant(NaiveDate::from_ymd_opt(y, m, d).unwrap(), h * 3600 + mi * 60 + s)
}

#[test]
fn session_edges_are_inclusive() {
    for (h, m, s) in [(9, 30, 0), (11, 30, 0), (13, 0, 0), (15, 0, 0)] {
        let t = bj(2024, 1, 8, h, m, s);
        assert_eq!(market_status(t), MarketStatus::Open, "{h:02}:{m:02}:{s:02}");
        assert!(is_market_open(t));
    }
}

#[test]
fn one_second_past_each_close() {
    assert_eq!(market_status(bj(2024, 1, 8, 11, 30, 1)), MarketStatus::Break);
    assert_eq!(market_status(bj(2024, 1, 8, 12, 59, 59)), MarketStatus::Break);
    assert_eq!(market_status(bj(2024, 1, 8, 15, 0, 1)), MarketStatus::Closed);
    assert_eq!(market_status(bj(2024, 1, 8, 9, 29, 59)), MarketStatus::Closed);
}

#[test]
fn weekends_are_always_closed() {
    for day in [13, 14] {
        for h in 0..24 {
            let t = bj(2024, 1, day, h, 15, 0);
            assert_eq!(market_status(t), MarketStatus::Closed, "2024-01-{day} {h}:15");
            assert!(!is_market_open(t));
        }
    }
}

#[test]
fn utc_midnight_boundary_uses_exchange_date() {
    // 2024-01-12T23:00Z is Saturday 07:00 in Shanghai.
    let t: DateTime<Utc> = "2024-01-12T23:00:00Z".parse().unwrap();
    assert_eq!(market_status(t), MarketStatus::Closed);
    // 2024-01-08T02:00Z is Monday 10:00 in Shanghai.
    let t: DateTime<Utc> = "2024-01-08T02:00:00Z".parse().unwrap();
    assert_eq!(market_status(t), MarketStatus::Open);
}

#[test]
fn next_open_rules() {
    // Before the morning open → today 09:30.
    assert_eq!(next_market_open(bj(2024, 1, 8, 8, 0, 0)), bj(2024, 1, 8, 9, 30, 0));
    // Lunch → today 13:00.
    assert_eq!(next_market_open(bj(2024, 1, 8, 12, 0, 0)), bj(2024, 1, 8, 13, 0, 0));
    // After close on Monday → Tuesday 09:30.
    assert_eq!(next_market_open(bj(2024, 1, 8, 15, 30, 0)), bj(2024, 1, 9, 9, 30, 0));
    // After close on Friday → Monday 09:30.
    assert_eq!(next_market_open(bj(2024, 1, 12, 16, 0, 0)), bj(2024, 1, 15, 9, 30, 0));
    // Saturday / Sunday → Monday 09:30.
    assert_eq!(next_market_open(bj(2024, 1, 13, 10, 0, 0)), bj(2024, 1, 15, 9, 30, 0));
    assert_eq!(next_market_open(bj(2024, 1, 14, 23, 59, 0)), bj(2024, 1, 15, 9, 30, 0));
}

#[test]
fn holiday_aware_next_open_skips_the_block() {
    let table = HolidayTable::builtin();
    let trading = |d: NaiveDate| is_weekday(d) && !table.is_holiday(d);

    // Mid-morning on 2024-10-01 (holiday): next open is Tue 2024-10-08.
    let got = next_market_open_on(bj(2024, 10, 1, 10, 0, 0), trading);
    assert_eq!(got, bj(2024, 10, 8, 9, 30, 0));

    // Weekday-only variant stops on the holiday itself.
    assert_eq!(next_market_open(bj(2024, 9, 30, 16, 0, 0)), bj(2024, 10, 1, 9, 30, 0));
}

#[test]
fn countdowns_are_non_negative() {
    let t = bj(2024, 1, 8, 9, 0, 0);
    assert_eq!(time_until_next_open(t), Duration::minutes(30));
    assert_eq!(time_until_next_close(t), Duration::zero());
    let t = bj(2024, 1, 8, 11, 0, 0);
    assert_eq!(time_until_next_open(t), Duration::zero());
    assert_eq!(time_until_next_close(t), Duration::minutes(30));
}

#[test]
fn poll_interval_tiers() {
    assert_eq!(update_interval(MarketStatus::Open).as_millis(), 90_000);
    assert_eq!(update_interval(MarketStatus::Break).as_millis(), 300_000);
    assert_eq!(update_interval(MarketStatus::Closed).as_millis(), 3_600_000);
}
