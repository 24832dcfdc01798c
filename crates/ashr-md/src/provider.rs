//! Provider boundary for intraday index bars.
//!
//! Only the bar type, request, error taxonomy and trait live here. The HTTP
//! implementation is in [`crate::http`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Bar
// ---------------------------------------------------------------------------

/// One intraday bar as served by the upstream minute-data service.
///
/// `time` is kept verbatim (`"2024-10-08 09:31:00"` style); the upstream
/// emits exchange-local wall time without an offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinuteBar {
    pub time: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, alias = "avg_price")]
    pub avg_price: f64,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinuteBarRequest {
    /// Symbol as configured (`sh000001`, `399006`, …).
    pub symbol: String,
    /// Bar period in minutes, passed through (`"1"`, `"5"`, …).
    pub period: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl MinuteBarRequest {
    pub fn new(symbol: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            period: period.into(),
            start_date: None,
            end_date: None,
        }
    }

    /// Restrict to a single trading date.
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self.end_date = Some(date);
        self
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ProviderError {
    /// Network, timeout or transport failure.
    Transport(String),
    /// The upstream returned a non-success status or an `error` payload.
    Api { code: Option<u16>, message: String },
    /// A response payload could not be decoded.
    Decode(String),
    /// The provider could not be constructed from its settings.
    Config(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Transport(msg) => write!(f, "transport error: {msg}"),
            ProviderError::Api {
                code: Some(c),
                message,
            } => write!(f, "provider api error code={c}: {message}"),
            ProviderError::Api {
                code: None,
                message,
            } => write!(f, "provider api error: {message}"),
            ProviderError::Decode(msg) => write!(f, "decode error: {msg}"),
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Upstream intraday data contract. Object safe; held as
/// `Arc<dyn MinuteBarProvider>` by the daemon.
#[async_trait::async_trait]
pub trait MinuteBarProvider: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Bars in upstream order; an empty vec is a valid answer (no session yet).
    async fn fetch_minute_bars(&self, req: &MinuteBarRequest)
        -> Result<Vec<MinuteBar>, ProviderError>;
}
