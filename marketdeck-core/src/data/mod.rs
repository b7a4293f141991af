//! Data layer: HTTP fetch, provider clients and normalizers, TTL cache,
//! and the service that ties them together.
//!
//! Provider clients fetch raw JSON and normalize it into canonical types.
//! The service layer above them owns the caches and the degrade-to-empty
//! policy; providers never see the cache.

pub mod alphavantage;
pub mod cache;
pub mod coingecko;
pub mod futures;
pub mod http;
pub mod sentiment;
pub mod service;

pub use cache::{CacheEntry, CacheKey, TtlCache};
pub use coingecko::{ExchangeTicker, GlobalStats, MarketSnapshot};
pub use http::FetchClient;
pub use sentiment::SentimentReading;
pub use service::DataService;

use serde_json::Value;

/// Numeric field access with the NaN convention: absent, null, or
/// non-numeric values read as NaN.
pub(crate) fn json_num(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(f64::NAN)
}

/// Like `json_num`, but also accepts numbers encoded as strings. The daily
/// quotes provider and the sentiment index both quote their numbers.
pub(crate) fn json_num_lenient(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// JSON type name for shape-violation error details.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
