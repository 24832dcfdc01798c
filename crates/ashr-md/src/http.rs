//! HTTP minute-bar provider.
//!
//! GET `{base}/stock_zh_index_spot_sina?symbol=..&period=..[&start_date=..&end_date=..]`
//!
//! The upstream answers with either a bare JSON array of bars, an object
//! wrapping them under `data`, or an object carrying `error`.

use serde::Deserialize;
use std::time::Duration;

use crate::provider::{MinuteBar, MinuteBarProvider, MinuteBarRequest, ProviderError};
use crate::upstream_symbol;

pub const MINUTE_ENDPOINT: &str = "stock_zh_index_spot_sina";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpMinuteProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMinuteProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ProviderError::Config("minute-data base url is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Config(format!("http client build failed: {e}")))?;
        Ok(Self { http, base_url })
    }

    fn endpoint_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), MINUTE_ENDPOINT)
    }
}

#[async_trait::async_trait]
impl MinuteBarProvider for HttpMinuteProvider {
    fn source_name(&self) -> &'static str {
        "http-minute"
    }

    async fn fetch_minute_bars(
        &self,
        req: &MinuteBarRequest,
    ) -> Result<Vec<MinuteBar>, ProviderError> {
        let mut query: Vec<(&str, String)> = vec![
            ("symbol", upstream_symbol(&req.symbol).to_string()),
            ("period", req.period.clone()),
        ];
        if let Some(d) = req.start_date {
            query.push(("start_date", d.format("%Y-%m-%d").to_string()));
        }
        if let Some(d) = req.end_date {
            query.push(("end_date", d.format("%Y-%m-%d").to_string()));
        }

        let resp = self
            .http
            .get(self.endpoint_url())
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Transport(format!("request timed out: {e}"))
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("body read failed: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<UpstreamBody>(&text)
                .ok()
                .and_then(UpstreamBody::error_message)
                .unwrap_or_else(|| status.to_string());
            return Err(ProviderError::Api {
                code: Some(status.as_u16()),
                message,
            });
        }

        let body: UpstreamBody = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Decode(format!("minute bars json decode failed: {e}")))?;

        match body {
            UpstreamBody::Bars(bars) => Ok(bars),
            UpstreamBody::Wrapped {
                data: Some(bars), ..
            } => Ok(bars),
            UpstreamBody::Wrapped { error: Some(e), .. } => Err(ProviderError::Api {
                code: None,
                message: e,
            }),
            UpstreamBody::Wrapped { .. } => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UpstreamBody {
    Bars(Vec<MinuteBar>),
    Wrapped {
        #[serde(default)]
        data: Option<Vec<MinuteBar>>,
        #[serde(default)]
        error: Option<String>,
    },
}

impl UpstreamBody {
    fn error_message(self) -> Option<String> {
        match self {
            UpstreamBody::Wrapped { error, .. } => error,
            UpstreamBody::Bars(_) => None,
        }
    }
}
