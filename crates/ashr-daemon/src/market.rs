//! Market status snapshot and the intraday minute-bar feed.

use std::sync::Arc;

use ashr_calendar::session::{
    next_market_close, next_market_open_on, session_phase, update_interval, MarketStatus,
};
use ashr_calendar::{classify, exchange_date};
use ashr_md::{index_name, MinuteBarProvider, MinuteBarRequest};
use ashr_runtime::{MarketTimer, TickFn, TradingDayProbe};
use futures_util::FutureExt;

use crate::api_types::{MarketStatusResponse, MinuteSnapshot};
use crate::state::{AppState, BusMsg};

/// Holiday-aware session snapshot at the state's clock.
///
/// Today's trading flag comes from the calendar service (persisted row
/// first); later dates are classified from the holiday table.
pub async fn market_status(state: &AppState) -> MarketStatusResponse {
    let now = state.clock.now();
    let today = exchange_date(now);
    let is_trade_day = state.calendar.is_trading_day(today).await;

    let phase = session_phase(now, is_trade_day);
    let status = phase.status();
    let holidays = state.calendar.holidays();
    let next_open = next_market_open_on(now, |d| {
        if d == today {
            is_trade_day
        } else {
            classify(d, holidays).is_trade_day
        }
    });
    let next_close = match status {
        MarketStatus::Open => next_market_close(now),
        _ => None,
    };

    MarketStatusResponse {
        now,
        trade_date: today,
        is_trade_day,
        phase,
        status,
        phase_text: phase.label(is_trade_day).to_string(),
        status_text: status.label().to_string(),
        next_open,
        next_close,
        ms_until_next_open: (next_open - now).num_milliseconds().max(0),
        ms_until_next_close: next_close
            .map(|c| (c - now).num_milliseconds().max(0))
            .unwrap_or(0),
        update_interval_ms: update_interval(status).as_millis() as u64,
    }
}

/// Fetch today's bars for every configured symbol, store them and publish
/// them on the bus. Per-symbol failures are logged and skipped. Returns the
/// number of symbols refreshed.
pub async fn poll_minute_bars(state: &AppState, provider: &dyn MinuteBarProvider) -> usize {
    let now = state.clock.now();
    let today = exchange_date(now);
    let market = &state.config.market;
    let mut refreshed = 0;

    for symbol in &market.symbols {
        let req = MinuteBarRequest::new(symbol.clone(), market.period.clone()).on(today);
        match provider.fetch_minute_bars(&req).await {
            Ok(bars) => {
                tracing::debug!(%symbol, bars = bars.len(), "minute bars refreshed");
                let snap = MinuteSnapshot {
                    symbol: symbol.clone(),
                    name: index_name(symbol).map(str::to_string),
                    trade_date: today,
                    fetched_at: now,
                    bars,
                };
                state
                    .minute_bars
                    .write()
                    .await
                    .insert(symbol.clone(), snap.clone());
                let _ = state.bus.send(BusMsg::MinuteBars(snap));
                refreshed += 1;
            }
            Err(err) => {
                tracing::warn!(
                    %symbol,
                    source = provider.source_name(),
                    error = %err,
                    "minute bar fetch failed"
                );
                state.publish_log("WARN", format!("minute bars for {symbol} unavailable: {err}"));
            }
        }
    }

    let _ = state.bus.send(BusMsg::MarketStatus(market_status(state).await));
    refreshed
}

/// Enable a market timer that polls `provider` during sessions. The feed
/// runs until the returned timer is stopped or dropped.
pub fn start_market_feed(state: Arc<AppState>, provider: Arc<dyn MinuteBarProvider>) -> MarketTimer {
    let probe: Arc<dyn TradingDayProbe> = state.calendar.clone();
    let clock = state.clock.clone();
    let tick: TickFn = Arc::new(move || {
        let state = Arc::clone(&state);
        let provider = Arc::clone(&provider);
        async move {
            poll_minute_bars(&state, provider.as_ref()).await;
        }
        .boxed()
    });

    let timer = MarketTimer::new(probe, clock, tick);
    timer.set_enabled(true);
    timer
}
