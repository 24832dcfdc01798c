//! Response types for the ashr-daemon HTTP endpoints.
//!
//! Calendar payloads reuse the domain types directly (`CalendarDay`,
//! `TradingDateInfo`, `CalendarStats`); only daemon-specific shapes live here.

use ashr_calendar::{MarketPhase, MarketStatus};
use ashr_md::MinuteBar;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    /// sha256 of the effective layered config.
    pub config_hash: String,
    /// false when running without a calendar database.
    pub store_configured: bool,
}

// ---------------------------------------------------------------------------
// 400 for malformed query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadParamResponse {
    pub error: String,
    /// Offending query parameter, e.g. "month".
    pub param: String,
}

// ---------------------------------------------------------------------------
// /v1/market/status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatusResponse {
    pub now: DateTime<Utc>,
    pub trade_date: NaiveDate,
    pub is_trade_day: bool,
    pub phase: MarketPhase,
    pub status: MarketStatus,
    pub phase_text: String,
    pub status_text: String,
    pub next_open: DateTime<Utc>,
    pub next_close: Option<DateTime<Utc>>,
    pub ms_until_next_open: i64,
    pub ms_until_next_close: i64,
    pub update_interval_ms: u64,
}

// ---------------------------------------------------------------------------
// /v1/market/minute-bars
// ---------------------------------------------------------------------------

/// Latest bars fetched for one symbol by the market feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinuteSnapshot {
    pub symbol: String,
    pub name: Option<String>,
    pub trade_date: NaiveDate,
    pub fetched_at: DateTime<Utc>,
    pub bars: Vec<MinuteBar>,
}
