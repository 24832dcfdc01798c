//! `ashr calendar ...`: offline calendar views plus the DB-backed resolver.

use anyhow::Result;
use ashr_calendar::stats::calendar_stats;
use ashr_calendar::{
    classify, complete_month, complete_year, exchange_date, parse_calendar_date, CalendarDay,
    HolidayTable, MonthKey,
};
use ashr_config::ResolverSettings;
use ashr_runtime::{LatestTradingDateResolver, PgStore, SystemClock};
use chrono::{Datelike, Utc};
use std::sync::Arc;

use super::display_status_name;

fn print_day(day: &CalendarDay) {
    match &day.holiday_name {
        Some(name) => println!(
            "date={} weekday={} trade_day={} status={} holiday_name={}",
            day.date,
            day.weekday,
            day.is_trade_day,
            display_status_name(day.display_status),
            name
        ),
        None => println!(
            "date={} weekday={} trade_day={} status={}",
            day.date,
            day.weekday,
            day.is_trade_day,
            display_status_name(day.display_status)
        ),
    }
}

/// Synthesized month (holiday table only). Defaults to the current
/// exchange-local month.
pub fn calendar_month(month: Option<String>, holidays: &HolidayTable) -> Result<()> {
    let month = match month {
        Some(raw) => raw.parse::<MonthKey>()?,
        None => MonthKey::of(exchange_date(Utc::now())),
    };
    let days = complete_month(month, &[], holidays);
    let trading = days.iter().filter(|d| d.is_trade_day).count();

    println!("month={} days={} trading_days={}", month, days.len(), trading);
    for day in &days {
        print_day(day);
    }
    Ok(())
}

pub fn calendar_classify(date: &str, holidays: &HolidayTable) -> Result<()> {
    let date = parse_calendar_date(date)?;
    print_day(&classify(date, holidays));
    Ok(())
}

pub fn calendar_stats_cmd(year: Option<i32>, holidays: &HolidayTable) -> Result<()> {
    let today = exchange_date(Utc::now());
    let year = year.unwrap_or_else(|| today.year());
    let days = complete_year(year, &[], holidays);
    let stats = calendar_stats(year, &days, today);

    println!(
        "year={} total_days={} trading_days={} holidays={} weekends={} trading_rate={:.1}",
        stats.year,
        stats.totals.total_days,
        stats.totals.trading_days,
        stats.totals.holidays,
        stats.totals.weekends,
        stats.totals.trading_rate
    );
    for m in &stats.months {
        println!(
            "month={} trading_days={} total_days={}",
            m.month, m.stats.trading_days, m.stats.total_days
        );
    }
    for u in &stats.upcoming {
        println!(
            "upcoming={} kind={} name={} days_until={}",
            u.date,
            display_status_name(u.kind),
            u.name,
            u.days_until
        );
    }
    Ok(())
}

/// Resolve the display date against the configured database.
pub async fn calendar_latest(resolver_cfg: &ResolverSettings) -> Result<()> {
    let pool = ashr_db::connect_from_env().await?;
    let store = Arc::new(PgStore::new(pool));
    let resolver = LatestTradingDateResolver::new(
        store.clone(),
        store,
        Arc::new(SystemClock),
        resolver_cfg.cache_ttl(),
    );
    let info = resolver.resolve().await;

    println!(
        "date={} is_today={} is_trade_day={} days_ago={}",
        info.date, info.is_today, info.is_trade_day, info.days_ago
    );
    println!("display_text={}", info.display_text);
    println!("badge={}", info.badge_text());
    Ok(())
}
