//! Key-gated daily quotes provider (Alpha Vantage-compatible).
//!
//! One query endpoint serves two routes: equity daily series and crypto
//! daily series. Which route a symbol takes is decided by a naming
//! convention, not provider metadata; see `split_crypto_pair`.

use super::http::FetchClient;
use super::{json_num_lenient, value_kind};
use crate::domain::{CanonicalBar, CanonicalSeries, Provider};
use crate::error::{ConfigError, DataError, NormalizeError};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const API_KEY_ENV_VAR: &str = "ALPHAVANTAGE_API_KEY";

const EQUITY_SERIES_KEY: &str = "Time Series (Daily)";
const CRYPTO_SERIES_KEY: &str = "Time Series (Digital Currency Daily)";

/// Split a "BASE-USD" style symbol on its *last* hyphen.
///
/// This is the provider's route dispatch: symbols ending in "-USD" take the
/// crypto route, everything else is treated as an equity ticker. It is a
/// naming convention rather than a guarantee; a hyphenated equity ticker
/// like BRK-B routes to equity because the suffix check comes first, and a
/// crypto listing that doesn't follow the convention routes wrong. Callers
/// that cannot live with the heuristic build a provider-tagged
/// `SymbolRequest` instead.
pub fn split_crypto_pair(symbol: &str) -> Option<(&str, &str)> {
    if !symbol.ends_with("-USD") {
        return None;
    }
    symbol.rsplit_once('-')
}

/// Daily quotes client. Fetches fail with `ConfigError::MissingApiKey`
/// until a key is configured; the service layer checks `has_api_key` up
/// front and degrades to a warned empty instead of an error page.
#[derive(Debug)]
pub struct AlphaVantageClient {
    http: Arc<FetchClient>,
    base_url: String,
    api_key: Option<String>,
}

impl AlphaVantageClient {
    pub fn new(http: Arc<FetchClient>, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Daily OHLCV series for an equity ticker or a BASE-USD crypto pair.
    pub fn daily_series(&self, symbol: &str) -> Result<CanonicalSeries, DataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey {
                env_var: API_KEY_ENV_VAR,
            })?;

        match split_crypto_pair(symbol) {
            Some((base, quote)) => {
                let params = [
                    ("function", "DIGITAL_CURRENCY_DAILY".to_string()),
                    ("symbol", base.to_string()),
                    ("market", quote.to_string()),
                    ("apikey", api_key.to_string()),
                ];
                let payload = self
                    .http
                    .get_json(Provider::Crypto, symbol, &self.base_url, &params)?;
                let bars = normalize_crypto_daily(&payload)?;
                Ok(CanonicalSeries::new(Provider::Crypto, symbol, bars))
            }
            None => {
                let params = [
                    ("function", "TIME_SERIES_DAILY".to_string()),
                    ("symbol", symbol.to_string()),
                    ("outputsize", "compact".to_string()),
                    ("apikey", api_key.to_string()),
                ];
                let payload = self
                    .http
                    .get_json(Provider::Equity, symbol, &self.base_url, &params)?;
                let bars = normalize_equity_daily(&payload)?;
                Ok(CanonicalSeries::new(Provider::Equity, symbol, bars))
            }
        }
    }
}

/// Shared walk over a date-keyed map of per-day field maps.
///
/// Rate-limit notes and error payloads arrive as objects without the series
/// key; they normalize to an empty series, not an error. Rows whose date
/// keys don't parse are skipped; rows whose fields aren't an object become
/// void bars for that date.
fn daily_bars<F>(
    payload: &Value,
    series_key: &str,
    provider: Provider,
    read: F,
) -> Result<Vec<CanonicalBar>, NormalizeError>
where
    F: Fn(&serde_json::Map<String, Value>, NaiveDate) -> CanonicalBar,
{
    let obj = match payload {
        Value::Object(map) => map,
        Value::Array(rows) if rows.is_empty() => return Ok(Vec::new()),
        other => {
            return Err(NormalizeError::UnrecognizedShape {
                provider,
                detail: format!("daily series: expected object, got {}", value_kind(other)),
            })
        }
    };

    let Some(series) = obj.get(series_key).and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(series.len());
    for (date_str, fields) in series {
        let Ok(date) = date_str.parse::<NaiveDate>() else {
            continue;
        };
        match fields.as_object() {
            Some(fields) => bars.push(read(fields, date)),
            None => bars.push(CanonicalBar::void(date)),
        }
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Normalize a crypto daily payload.
///
/// The provider never reports a true session open for crypto pairs, so
/// `open` is NaN on every bar. Field values are quoted numbers under the
/// provider's numbered keys ("2a. high (USD)" and friends).
pub fn normalize_crypto_daily(payload: &Value) -> Result<Vec<CanonicalBar>, NormalizeError> {
    daily_bars(payload, CRYPTO_SERIES_KEY, Provider::Crypto, |fields, date| CanonicalBar {
        date,
        open: f64::NAN,
        high: json_num_lenient(fields.get("2a. high (USD)")),
        low: json_num_lenient(fields.get("3a. low (USD)")),
        close: json_num_lenient(fields.get("4a. close (USD)")),
        volume: json_num_lenient(fields.get("5. volume")),
    })
}

/// Normalize an equity daily payload ("1. open" through "5. volume").
pub fn normalize_equity_daily(payload: &Value) -> Result<Vec<CanonicalBar>, NormalizeError> {
    daily_bars(payload, EQUITY_SERIES_KEY, Provider::Equity, |fields, date| CanonicalBar {
        date,
        open: json_num_lenient(fields.get("1. open")),
        high: json_num_lenient(fields.get("2. high")),
        low: json_num_lenient(fields.get("3. low")),
        close: json_num_lenient(fields.get("4. close")),
        volume: json_num_lenient(fields.get("5. volume")),
    })
}
