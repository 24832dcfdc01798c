//! Shared runtime state for ashr-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. Calendar and resolver
//! services are built once at boot around the injected store and clock.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use ashr_calendar::HolidayTable;
use ashr_config::DeskConfig;
use ashr_runtime::{CalendarService, CalendarStore, Clock, LatestTradingDateResolver, QuoteStore};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use crate::api_types::{MarketStatusResponse, MinuteSnapshot};

// ---------------------------------------------------------------------------
// BusMsg: SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat { ts_millis: i64 },
    MarketStatus(MarketStatusResponse),
    MinuteBars(MinuteSnapshot),
    LogLine { level: String, msg: String },
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Everything a handler needs besides the request.
pub struct Services {
    pub calendar_store: Arc<dyn CalendarStore>,
    pub quote_store: Arc<dyn QuoteStore>,
    pub holidays: HolidayTable,
    pub clock: Arc<dyn Clock>,
    pub config: DeskConfig,
    pub config_hash: String,
    /// false when booted without a database.
    pub store_configured: bool,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    pub build: BuildInfo,
    pub calendar: Arc<CalendarService>,
    pub resolver: Arc<LatestTradingDateResolver>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<DeskConfig>,
    pub config_hash: String,
    pub store_configured: bool,
    /// Latest minute bars per configured symbol, filled by the market feed.
    pub minute_bars: Arc<RwLock<BTreeMap<String, MinuteSnapshot>>>,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);

        let calendar = CalendarService::new(
            services.calendar_store.clone(),
            Arc::new(services.holidays),
            services.clock.clone(),
        );
        let resolver = LatestTradingDateResolver::new(
            services.calendar_store,
            services.quote_store,
            services.clock.clone(),
            services.config.resolver.cache_ttl(),
        );

        Self {
            bus,
            build: BuildInfo {
                service: "ashr-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            calendar: Arc::new(calendar),
            resolver: Arc::new(resolver),
            clock: services.clock,
            config: Arc::new(services.config),
            config_hash: services.config_hash,
            store_configured: services.store_configured,
            minute_bars: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Forward a log line to SSE subscribers. Dropped when nobody listens.
    pub fn publish_log(&self, level: &str, msg: impl Into<String>) {
        let _ = self.bus.send(BusMsg::LogLine {
            level: level.to_string(),
            msg: msg.into(),
        });
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}
