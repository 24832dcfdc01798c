//! Typed settings over the merged config tree.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub calendar: CalendarSettings,
    pub resolver: ResolverSettings,
    pub market: MarketSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Optional JSON holiday file merged over the built-in table.
    pub holiday_file: Option<String>,
    /// Default row count for the recent-dates listing.
    pub recent_dates_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    /// Run the minute-bar poller in the daemon.
    pub enabled: bool,
    /// Base URL of the upstream minute-bar service.
    pub source_url: String,
    pub symbols: Vec<String>,
    /// Bar period in minutes, passed through verbatim.
    pub period: String,
    pub request_timeout_secs: u64,
}

/// Largest accepted `recent_dates_limit`; one year plus a leap day.
pub const MAX_RECENT_DATES_LIMIT: u32 = 366;

/// Largest accepted `resolver.cache_ttl_secs` (one day).
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            holiday_file: None,
            recent_dates_limit: 90,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self { cache_ttl_secs: 300 }
    }
}

impl ResolverSettings {
    /// Cache TTL as a chrono duration, clamped to `1..=MAX_CACHE_TTL_SECS`
    /// so an unvalidated value can never overflow.
    pub fn cache_ttl(&self) -> chrono::Duration {
        let secs = self.cache_ttl_secs.clamp(1, MAX_CACHE_TTL_SECS);
        chrono::Duration::seconds(i64::try_from(secs).unwrap_or(1))
    }
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            source_url: "http://127.0.0.1:8000".to_string(),
            symbols: vec!["sh000001".to_string()],
            period: "1".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl DeskConfig {
    pub fn from_json(v: &Value) -> Result<Self> {
        let cfg: DeskConfig =
            serde_json::from_value(v.clone()).context("config does not match DeskConfig")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let limit = self.calendar.recent_dates_limit;
        if limit == 0 || limit > MAX_RECENT_DATES_LIMIT {
            bail!(
                "CONFIG_INVALID calendar.recent_dates_limit={} (expected 1..={})",
                limit,
                MAX_RECENT_DATES_LIMIT
            );
        }
        let ttl = self.resolver.cache_ttl_secs;
        if ttl == 0 || ttl > MAX_CACHE_TTL_SECS {
            bail!(
                "CONFIG_INVALID resolver.cache_ttl_secs={} (expected 1..={})",
                ttl,
                MAX_CACHE_TTL_SECS
            );
        }
        if self.market.enabled {
            if self.market.source_url.trim().is_empty() {
                bail!("CONFIG_INVALID market.source_url is required when market.enabled");
            }
            if self.market.symbols.is_empty() {
                bail!("CONFIG_INVALID market.symbols is empty while market.enabled");
            }
        }
        if self.market.request_timeout_secs == 0 {
            bail!("CONFIG_INVALID market.request_timeout_secs must be > 0");
        }
        Ok(())
    }
}
