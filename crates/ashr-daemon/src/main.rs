//! ashr-daemon entry point.
//!
//! Thin: loads config, picks the calendar store, builds the shared state,
//! wires middleware and starts the HTTP server. Handlers live in `routes.rs`.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use ashr_calendar::HolidayTable;
use ashr_config::{report_unused_keys, DeskConfig, UnusedKeyPolicy};
use ashr_daemon::{market, routes, state};
use ashr_md::HttpMinuteProvider;
use ashr_runtime::{CalendarStore, PgStore, QuoteStore, SystemClock, UnavailableStore};
use axum::http::{HeaderValue, Method};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Dev convenience; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let loaded = ashr_config::load_from_env().context("config load failed")?;
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    for ptr in &report.unused_leaf_pointers {
        warn!(pointer = %ptr, "config key is not consumed by the daemon");
    }
    let config = loaded.desk()?;
    info!(config_hash = %loaded.config_hash, "config loaded");

    let holidays = load_holidays(&config)?;
    let (calendar_store, quote_store, store_configured) = open_store().await;

    let shared = Arc::new(state::AppState::new(state::Services {
        calendar_store,
        quote_store,
        holidays,
        clock: Arc::new(SystemClock),
        config,
        config_hash: loaded.config_hash.clone(),
        store_configured,
    }));

    state::spawn_heartbeat(shared.bus.clone(), Duration::from_secs(1));

    // Held for the lifetime of the server; dropping it stops the feed.
    let _market_feed = if shared.config.market.enabled {
        let provider = HttpMinuteProvider::with_timeout(
            shared.config.market.source_url.clone(),
            Duration::from_secs(shared.config.market.request_timeout_secs),
        )
        .context("minute-data provider")?;
        info!(
            source_url = %shared.config.market.source_url,
            symbols = ?shared.config.market.symbols,
            "market feed enabled"
        );
        Some(market::start_market_feed(
            Arc::clone(&shared),
            Arc::new(provider),
        ))
    } else {
        None
    };

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr_from_env().unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8899)));
    info!("ashr-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("ASHR_DAEMON_ADDR").ok()?.parse().ok()
}

/// Built-in table, overlaid with `calendar.holiday_file` when configured.
fn load_holidays(config: &DeskConfig) -> anyhow::Result<HolidayTable> {
    let builtin = HolidayTable::builtin();
    let Some(path) = config.calendar.holiday_file.as_deref() else {
        return Ok(builtin);
    };
    let extra = HolidayTable::load_json_file(path)
        .with_context(|| format!("calendar.holiday_file={path}"))?;
    info!(path, entries = extra.len(), "holiday file merged");
    Ok(builtin.merged(extra))
}

type Stores = (Arc<dyn CalendarStore>, Arc<dyn QuoteStore>, bool);

/// Postgres when `ASHR_DATABASE_URL` is set and reachable; otherwise every
/// calendar read degrades to the holiday table.
async fn open_store() -> Stores {
    if std::env::var(ashr_db::ENV_DB_URL).is_err() {
        warn!("{} not set; serving a synthesized calendar", ashr_db::ENV_DB_URL);
        return unavailable_stores();
    }
    match ashr_db::connect_from_env().await {
        Ok(pool) => {
            let store = Arc::new(PgStore::new(pool));
            let calendar: Arc<dyn CalendarStore> = store.clone();
            let quotes: Arc<dyn QuoteStore> = store;
            (calendar, quotes, true)
        }
        Err(err) => {
            warn!(error = %err, "calendar database unreachable; serving a synthesized calendar");
            unavailable_stores()
        }
    }
}

fn unavailable_stores() -> Stores {
    let calendar: Arc<dyn CalendarStore> = Arc::new(UnavailableStore);
    let quotes: Arc<dyn QuoteStore> = Arc::new(UnavailableStore);
    (calendar, quotes, false)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl-c handler failed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET])
        .allow_headers(tower_http::cors::Any)
}
