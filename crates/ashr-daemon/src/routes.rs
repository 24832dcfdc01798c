//! Axum router and all HTTP handlers for ashr-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Query parameters are parsed here; a malformed one is
//! answered with `400 {error, param}` before any service is touched.

use std::{convert::Infallible, sync::Arc};

use ashr_calendar::{parse_calendar_date, MonthKey};
use ashr_runtime::calendar::MAX_RECENT_LIMIT;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use chrono::Datelike;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::{
    api_types::{BadParamResponse, HealthResponse},
    market,
    state::{uptime_secs, AppState, BusMsg},
};

/// Years accepted by `year=` parameters.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1990..=2100;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/calendar", get(calendar))
        .route("/v1/calendar/dates", get(calendar_dates))
        .route("/v1/calendar/latest-trading-date", get(latest_trading_date))
        .route("/v1/calendar/stats", get(calendar_stats))
        .route("/v1/market/status", get(market_status))
        .route("/v1/market/minute-bars", get(minute_bars))
        .route("/v1/stream", get(stream))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// 400 helper
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct BadParam {
    param: &'static str,
    error: String,
}

impl BadParam {
    fn new(param: &'static str, error: impl ToString) -> Self {
        Self {
            param,
            error: error.to_string(),
        }
    }
}

impl IntoResponse for BadParam {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BadParamResponse {
                error: self.error,
                param: self.param.to_string(),
            }),
        )
            .into_response()
    }
}

fn parse_date_param(param: &'static str, raw: &str) -> Result<chrono::NaiveDate, BadParam> {
    parse_calendar_date(raw).map_err(|e| BadParam::new(param, e))
}

fn parse_year_param(raw: &str) -> Result<i32, BadParam> {
    let year: i32 = raw
        .trim()
        .parse()
        .map_err(|_| BadParam::new("year", format!("invalid year '{raw}'. expected YYYY")))?;
    if !YEAR_RANGE.contains(&year) {
        return Err(BadParam::new(
            "year",
            format!(
                "year {year} out of range {}..={}",
                YEAR_RANGE.start(),
                YEAR_RANGE.end()
            ),
        ));
    }
    Ok(year)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
            uptime_secs: uptime_secs(),
            config_hash: st.config_hash.clone(),
            store_configured: st.store_configured,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/calendar
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarQuery {
    start_date: Option<String>,
    end_date: Option<String>,
    month: Option<String>,
    year: Option<String>,
}

/// Precedence: `startDate`+`endDate`, then `month`, then `year`, else the
/// current exchange-local month.
pub(crate) async fn calendar(
    State(st): State<Arc<AppState>>,
    Query(q): Query<CalendarQuery>,
) -> Result<impl IntoResponse, BadParam> {
    let days = match (q.start_date.as_deref(), q.end_date.as_deref()) {
        (Some(start), Some(end)) => {
            let start = parse_date_param("startDate", start)?;
            let end = parse_date_param("endDate", end)?;
            st.calendar
                .range(start, end)
                .await
                .map_err(|e| BadParam::new("endDate", e))?
        }
        (Some(_), None) => return Err(BadParam::new("endDate", "endDate is required with startDate")),
        (None, Some(_)) => return Err(BadParam::new("startDate", "startDate is required with endDate")),
        (None, None) => {
            if let Some(raw) = q.month.as_deref() {
                let month: MonthKey = raw.parse().map_err(|e| BadParam::new("month", e))?;
                st.calendar.month(month).await
            } else if let Some(raw) = q.year.as_deref() {
                let year = parse_year_param(raw)?;
                st.calendar.year(year).await
            } else {
                st.calendar.current_month().await
            }
        }
    };
    Ok((StatusCode::OK, Json(days)))
}

// ---------------------------------------------------------------------------
// GET /v1/calendar/dates
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DatesQuery {
    limit: Option<String>,
}

pub(crate) async fn calendar_dates(
    State(st): State<Arc<AppState>>,
    Query(q): Query<DatesQuery>,
) -> Result<impl IntoResponse, BadParam> {
    let limit = match q.limit.as_deref() {
        None => st.config.calendar.recent_dates_limit,
        Some(raw) => {
            let n: u32 = raw.trim().parse().map_err(|_| {
                BadParam::new("limit", format!("invalid limit '{raw}'. expected a positive integer"))
            })?;
            if n == 0 || n > MAX_RECENT_LIMIT {
                return Err(BadParam::new(
                    "limit",
                    format!("limit {n} out of range 1..={MAX_RECENT_LIMIT}"),
                ));
            }
            n
        }
    };
    Ok((StatusCode::OK, Json(st.calendar.recent(limit).await)))
}

// ---------------------------------------------------------------------------
// GET /v1/calendar/latest-trading-date
// ---------------------------------------------------------------------------

pub(crate) async fn latest_trading_date(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(st.resolver.resolve().await))
}

// ---------------------------------------------------------------------------
// GET /v1/calendar/stats
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatsQuery {
    year: Option<String>,
}

pub(crate) async fn calendar_stats(
    State(st): State<Arc<AppState>>,
    Query(q): Query<StatsQuery>,
) -> Result<impl IntoResponse, BadParam> {
    let year = match q.year.as_deref() {
        Some(raw) => parse_year_param(raw)?,
        None => st.clock.today().year(),
    };
    Ok((StatusCode::OK, Json(st.calendar.stats(year).await)))
}

// ---------------------------------------------------------------------------
// GET /v1/market/status
// ---------------------------------------------------------------------------

pub(crate) async fn market_status(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(market::market_status(&st).await))
}

// ---------------------------------------------------------------------------
// GET /v1/market/minute-bars
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MinuteBarsQuery {
    symbol: Option<String>,
}

/// Latest in-memory bars for `symbol` (default: first configured symbol).
/// 404 until the market feed has fetched that symbol.
pub(crate) async fn minute_bars(
    State(st): State<Arc<AppState>>,
    Query(q): Query<MinuteBarsQuery>,
) -> Response {
    let symbol = match q.symbol.as_deref().map(str::trim) {
        Some("") => return BadParam::new("symbol", "symbol must not be empty").into_response(),
        Some(s) => s.to_string(),
        None => match st.config.market.symbols.first() {
            Some(s) => s.clone(),
            None => return BadParam::new("symbol", "no symbol configured").into_response(),
        },
    };

    match st.minute_bars.read().await.get(&symbol) {
        Some(snap) => (StatusCode::OK, Json(snap.clone())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(BadParamResponse {
                error: format!("no minute bars for {symbol} yet"),
                param: "symbol".to_string(),
            }),
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::MarketStatus(_) => "market_status",
                    BusMsg::MinuteBars(_) => "minute_bars",
                    BusMsg::LogLine { .. } => "log",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
