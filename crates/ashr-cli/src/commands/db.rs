//! `ashr db ...`: status, migrations and calendar seeding.

use anyhow::Result;
use ashr_calendar::{complete_year, HolidayTable, StoredDay};
use chrono::NaiveDate;

pub async fn db_status() -> Result<()> {
    let pool = ashr_db::connect_from_env().await?;
    let s = ashr_db::status(&pool).await?;
    println!(
        "db_ok={} has_calendar_table={} has_quote_table={}",
        s.ok, s.has_calendar_table, s.has_quote_table
    );
    Ok(())
}

pub async fn db_migrate() -> Result<()> {
    let pool = ashr_db::connect_from_env().await?;
    ashr_db::migrate(&pool).await?;
    println!("migrations_applied=true");
    Ok(())
}

/// Persist the synthesized calendar for `year`. Guardrail: refuses to
/// overwrite a year that already has rows unless `yes` is set.
pub async fn db_seed_calendar(year: i32, yes: bool, holidays: &HolidayTable) -> Result<()> {
    let (Some(first), Some(last)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        anyhow::bail!("invalid --year {}", year);
    };

    let pool = ashr_db::connect_from_env().await?;
    let existing = ashr_db::fetch_calendar_range(&pool, first, last).await?;
    if !existing.is_empty() && !yes {
        anyhow::bail!(
            "REFUSING SEED: {} calendar row(s) already stored for {}. Re-run with: `ashr db seed-calendar --year {} --yes`",
            existing.len(),
            year,
            year
        );
    }

    let days = complete_year(year, &[], holidays);
    for day in &days {
        let row = StoredDay {
            date: day.date,
            is_trade_day: day.is_trade_day,
            is_holiday: day.is_holiday,
            holiday_name: day.holiday_name.clone(),
        };
        ashr_db::upsert_calendar_day(&pool, &row).await?;
    }
    let trading = days.iter().filter(|d| d.is_trade_day).count();
    tracing::info!(year, rows = days.len(), trading, "calendar seeded");
    println!("year={} rows={} trading_days={}", year, days.len(), trading);
    Ok(())
}
