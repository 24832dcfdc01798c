//! `ashr market status`: session phase at an instant, holiday-aware.

use anyhow::Result;
use ashr_calendar::session::{next_market_close, next_market_open_on, session_phase, update_interval};
use ashr_calendar::{classify, exchange_date, HolidayTable, MarketStatus};
use chrono::{DateTime, Utc};

pub fn market_status(at: DateTime<Utc>, holidays: &HolidayTable) -> Result<()> {
    let today = exchange_date(at);
    let is_trade_day = classify(today, holidays).is_trade_day;
    let phase = session_phase(at, is_trade_day);
    let status = phase.status();
    let next_open = next_market_open_on(at, |d| classify(d, holidays).is_trade_day);
    let next_close = match status {
        MarketStatus::Open => next_market_close(at),
        _ => None,
    };

    println!("now={}", at.to_rfc3339());
    println!("trade_date={} is_trade_day={}", today, is_trade_day);
    println!(
        "phase={} status={}",
        serde_json::to_value(phase)?.as_str().unwrap_or_default(),
        serde_json::to_value(status)?.as_str().unwrap_or_default()
    );
    println!("phase_text={} status_text={}", phase.label(is_trade_day), status.label());
    println!("next_open={}", next_open.to_rfc3339());
    match next_close {
        Some(c) => println!("next_close={}", c.to_rfc3339()),
        None => println!("next_close=none"),
    }
    println!("update_interval_ms={}", update_interval(status).as_millis());
    Ok(())
}
