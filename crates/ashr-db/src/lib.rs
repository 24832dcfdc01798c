//! ashr-db
//!
//! Postgres access for the persisted exchange calendar (`trade_calendar`) and
//! the end-of-day quote table (`daily_quote`). Plain `sqlx::query` + binds,
//! no compile-time checked macros, so the crate builds without a database.

use anyhow::{Context, Result};
use ashr_calendar::StoredDay;
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

pub const ENV_DB_URL: &str = "ASHR_DATABASE_URL";

/// Connect to Postgres using `ASHR_DATABASE_URL`.
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    connect(&url).await
}

pub async fn connect(url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;
    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_calendar_table: bool,
    pub has_quote_table: bool,
}

/// Connectivity + schema presence.
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    Ok(DbStatus {
        ok: one == 1,
        has_calendar_table: table_exists(pool, "trade_calendar").await?,
        has_quote_table: table_exists(pool, "daily_quote").await?,
    })
}

async fn table_exists(pool: &PgPool, name: &str) -> Result<bool> {
    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema = 'public' and table_name = $1
        )
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .with_context(|| format!("status table-exists query failed: {name}"))?;
    Ok(exists)
}

// ---------------------------------------------------------------------------
// trade_calendar
// ---------------------------------------------------------------------------

const CALENDAR_COLUMNS: &str = "calendar_date, is_trade_day, is_holiday, holiday_name";

fn stored_day(row: &PgRow) -> Result<StoredDay> {
    Ok(StoredDay {
        date: row.try_get("calendar_date")?,
        is_trade_day: row.try_get("is_trade_day")?,
        is_holiday: row.try_get("is_holiday")?,
        holiday_name: row.try_get("holiday_name")?,
    })
}

/// Persisted rows in `[start, end]`, ascending by date.
pub async fn fetch_calendar_range(
    pool: &PgPool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<StoredDay>> {
    let rows = sqlx::query(&format!(
        "select {CALENDAR_COLUMNS} from trade_calendar \
         where calendar_date between $1 and $2 \
         order by calendar_date asc"
    ))
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .with_context(|| format!("fetch_calendar_range failed: {start}..={end}"))?;

    rows.iter().map(stored_day).collect()
}

pub async fn fetch_calendar_day(pool: &PgPool, date: NaiveDate) -> Result<Option<StoredDay>> {
    let row = sqlx::query(&format!(
        "select {CALENDAR_COLUMNS} from trade_calendar where calendar_date = $1"
    ))
    .bind(date)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("fetch_calendar_day failed: {date}"))?;

    row.as_ref().map(stored_day).transpose()
}

/// Most recent persisted trading day strictly before `date`.
pub async fn latest_trade_day_before(pool: &PgPool, date: NaiveDate) -> Result<Option<NaiveDate>> {
    let row: Option<(NaiveDate,)> = sqlx::query_as(
        r#"
        select calendar_date
        from trade_calendar
        where is_trade_day and calendar_date < $1
        order by calendar_date desc
        limit 1
        "#,
    )
    .bind(date)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("latest_trade_day_before failed: {date}"))?;

    Ok(row.map(|(d,)| d))
}

/// Newest `limit` persisted rows, descending by date.
pub async fn recent_calendar_days(pool: &PgPool, limit: u32) -> Result<Vec<StoredDay>> {
    let rows = sqlx::query(&format!(
        "select {CALENDAR_COLUMNS} from trade_calendar \
         order by calendar_date desc \
         limit $1"
    ))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await
    .context("recent_calendar_days failed")?;

    rows.iter().map(stored_day).collect()
}

/// Insert or overwrite one calendar row.
pub async fn upsert_calendar_day(pool: &PgPool, day: &StoredDay) -> Result<()> {
    sqlx::query(
        r#"
        insert into trade_calendar (calendar_date, is_trade_day, is_holiday, holiday_name)
        values ($1, $2, $3, $4)
        on conflict (calendar_date) do update set
          is_trade_day = excluded.is_trade_day,
          is_holiday   = excluded.is_holiday,
          holiday_name = excluded.holiday_name,
          updated_at   = now()
        "#,
    )
    .bind(day.date)
    .bind(day.is_trade_day)
    .bind(day.is_holiday)
    .bind(day.holiday_name.as_deref())
    .execute(pool)
    .await
    .with_context(|| format!("upsert_calendar_day failed: {}", day.date))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// daily_quote
// ---------------------------------------------------------------------------

/// Latest `trade_date` present in `daily_quote`, if any.
pub async fn latest_quote_date(pool: &PgPool) -> Result<Option<NaiveDate>> {
    let (d,): (Option<NaiveDate>,) =
        sqlx::query_as::<_, (Option<NaiveDate>,)>("select max(trade_date) from daily_quote")
            .fetch_one(pool)
            .await
            .context("latest_quote_date failed")?;
    Ok(d)
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

/// Pool from `ASHR_DATABASE_URL` with migrations applied. DB-backed tests are
/// `#[ignore]`d and call this first.
pub async fn testkit_db_pool() -> Result<PgPool> {
    let pool = connect_from_env().await?;
    migrate(&pool).await?;
    Ok(pool)
}
