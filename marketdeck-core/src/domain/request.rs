//! Provider families, per-query symbol requests, and dashboard time ranges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream provider family a symbol resolves against.
///
/// Part of every cache key and every fetch error, so errors stay attributable
/// after they cross the cache's fan-out path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Crypto,
    Equity,
    Commodity,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Crypto => "crypto",
            Provider::Equity => "equity",
            Provider::Commodity => "commodity",
        };
        f.write_str(name)
    }
}

/// One UI query: a symbol against a provider family over a day window.
///
/// Constructed per interaction and never mutated. `vs_currency` only applies
/// to the crypto family; `None` means the configured default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRequest {
    pub provider: Provider,
    pub symbol: String,
    pub vs_currency: Option<String>,
    pub window_days: u32,
}

impl SymbolRequest {
    pub fn new(provider: Provider, symbol: impl Into<String>, window_days: u32) -> Self {
        Self {
            provider,
            symbol: symbol.into(),
            vs_currency: None,
            window_days,
        }
    }

    pub fn with_vs_currency(mut self, vs_currency: impl Into<String>) -> Self {
        self.vs_currency = Some(vs_currency.into());
        self
    }
}

/// Dashboard time ranges and their day spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    Day,
    Week,
    Month,
    ThreeMonths,
    SixMonths,
    Year,
}

impl TimeRange {
    pub const ALL: [TimeRange; 6] = [
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::ThreeMonths,
        TimeRange::SixMonths,
        TimeRange::Year,
    ];

    /// Window span in calendar days.
    pub fn days(self) -> u32 {
        match self {
            TimeRange::Day => 1,
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::ThreeMonths => 90,
            TimeRange::SixMonths => 180,
            TimeRange::Year => 365,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Day => "1D",
            TimeRange::Week => "1W",
            TimeRange::Month => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::SixMonths => "6M",
            TimeRange::Year => "1Y",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    /// Accepts the canonical labels plus "7D", the label the crypto page
    /// historically used for the week range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "1D" => Ok(TimeRange::Day),
            "1W" | "7D" => Ok(TimeRange::Week),
            "1M" => Ok(TimeRange::Month),
            "3M" => Ok(TimeRange::ThreeMonths),
            "6M" => Ok(TimeRange::SixMonths),
            "1Y" => Ok(TimeRange::Year),
            other => Err(format!(
                "unknown time range '{other}' (expected 1D, 1W, 1M, 3M, 6M, or 1Y)"
            )),
        }
    }
}
