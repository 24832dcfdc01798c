//! ashr-md
//!
//! Intraday index bars from the upstream minute-data service.
//!
//! This crate owns the provider abstraction and the HTTP provider. It keeps
//! no state and does not schedule anything; the daemon's market timer decides
//! when to fetch and where the bars go.

pub mod http;
pub mod provider;

pub use http::HttpMinuteProvider;
pub use provider::{MinuteBar, MinuteBarProvider, MinuteBarRequest, ProviderError};

/// Exchange-prefixed index symbols and the bare codes the upstream expects.
pub const INDEX_CODES: &[(&str, &str, &str)] = &[
    ("sh000001", "000001", "上证指数"),
    ("sz399001", "399001", "深证成指"),
    ("sz399006", "399006", "创业板指"),
    ("sh000300", "000300", "沪深300"),
    ("sh000905", "000905", "中证500"),
];

/// Code sent upstream for `symbol`: known index aliases map to their bare
/// code, anything else passes through trimmed.
pub fn upstream_symbol(symbol: &str) -> &str {
    let s = symbol.trim();
    INDEX_CODES
        .iter()
        .find(|(alias, _, _)| alias.eq_ignore_ascii_case(s))
        .map(|(_, code, _)| *code)
        .unwrap_or(s)
}

/// Display name of a known index symbol (prefixed or bare).
pub fn index_name(symbol: &str) -> Option<&'static str> {
    let s = symbol.trim();
    INDEX_CODES
        .iter()
        .find(|(alias, code, _)| alias.eq_ignore_ascii_case(s) || *code == s)
        .map(|(_, _, name)| *name)
}
