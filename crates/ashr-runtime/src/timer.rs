//! Adaptive market timer.
//!
//! Runs a callback every 90 s while the exchange is in session and otherwise
//! sleeps until the next session start (never less than a minute). Each
//! enable spawns one tokio task (a "generation"); disabling, `stop()` or
//! dropping the timer flips that generation's stopped flag and aborts it.
//! The loop re-checks the flag after every await, so a callback can never
//! start after the generation was stopped.

use anyhow::Result;
use ashr_calendar::session::{
    is_weekday, market_status, next_market_open_on, update_interval, MarketStatus,
};
use ashr_calendar::exchange_date;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::calendar::CalendarService;
use crate::clock::Clock;

/// Shortest sleep between checks outside a session.
pub const MIN_IDLE_WAIT: Duration = Duration::from_secs(60);

/// Does `date` host trading sessions?
#[async_trait]
pub trait TradingDayProbe: Send + Sync {
    async fn is_trading_day(&self, date: NaiveDate) -> Result<bool>;
}

#[async_trait]
impl TradingDayProbe for CalendarService {
    async fn is_trading_day(&self, date: NaiveDate) -> Result<bool> {
        Ok(CalendarService::is_trading_day(self, date).await)
    }
}

pub type TickFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct Generation {
    stopped: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Generation {
    fn stop(self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.handle.abort();
    }
}

pub struct MarketTimer {
    probe: Arc<dyn TradingDayProbe>,
    clock: Arc<dyn Clock>,
    on_tick: TickFn,
    current: Mutex<Option<Generation>>,
}

impl MarketTimer {
    pub fn new(probe: Arc<dyn TradingDayProbe>, clock: Arc<dyn Clock>, on_tick: TickFn) -> Self {
        Self {
            probe,
            clock,
            on_tick,
            current: Mutex::new(None),
        }
    }

    /// Start a generation if none is running, or stop the running one.
    /// Must be called inside a tokio runtime when enabling.
    pub fn set_enabled(&self, enabled: bool) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if enabled {
            if current.as_ref().is_some_and(|g| !g.handle.is_finished()) {
                return;
            }
            let stopped = Arc::new(AtomicBool::new(false));
            let handle = tokio::spawn(run_generation(
                self.probe.clone(),
                self.clock.clone(),
                self.on_tick.clone(),
                stopped.clone(),
            ));
            tracing::info!("market timer enabled");
            *current = Some(Generation { stopped, handle });
        } else if let Some(gen) = current.take() {
            gen.stop();
            tracing::info!("market timer disabled");
        }
    }

    pub fn stop(&self) {
        self.set_enabled(false);
    }

    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|g| !g.handle.is_finished())
    }
}

impl Drop for MarketTimer {
    fn drop(&mut self) {
        let current = self.current.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(gen) = current.take() {
            gen.stop();
        }
    }
}

async fn run_generation(
    probe: Arc<dyn TradingDayProbe>,
    clock: Arc<dyn Clock>,
    on_tick: TickFn,
    stopped: Arc<AtomicBool>,
) {
    loop {
        if stopped.load(Ordering::SeqCst) {
            return;
        }
        let now = clock.now();
        let today = exchange_date(now);

        // None = unknown (probe failed); treated as not open.
        let trading = match probe.is_trading_day(today).await {
            Ok(v) => Some(v),
            Err(err) => {
                tracing::warn!(%today, error = %err, "market timer: trading-day check failed");
                None
            }
        };
        if stopped.load(Ordering::SeqCst) {
            return;
        }

        let wait = if trading == Some(true) && market_status(now) == MarketStatus::Open {
            (on_tick)().await;
            if stopped.load(Ordering::SeqCst) {
                return;
            }
            update_interval(MarketStatus::Open)
        } else {
            // A confirmed closure skips the rest of today; an unknown day is
            // retried after the minimum wait.
            let skip_today = trading == Some(false);
            let next = next_market_open_on(now, |d| is_weekday(d) && !(skip_today && d == today));
            let until = (next - now).to_std().unwrap_or(Duration::ZERO);
            until.max(MIN_IDLE_WAIT)
        };

        tracing::debug!(%today, wait_secs = wait.as_secs(), "market timer: sleeping");
        tokio::time::sleep(wait).await;
    }
}
