//! Crypto market data client (CoinGecko-compatible API) and its normalizers.
//!
//! Four endpoints: per-coin market snapshots with sparklines, historical
//! market charts, global market stats, and per-coin exchange tickers.
//! Normalizers are pure functions over the fetched JSON so they can be
//! exercised against captured payloads without a network.

use super::http::FetchClient;
use super::{json_num, value_kind};
use crate::domain::{CanonicalBar, CanonicalSeries, Provider, PLOTTABLE_MIN_POINTS};
use crate::error::{DataError, NormalizeError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// One coin's market card: spot price, 24h move, and a 7-day sparkline.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub id: String,
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub change_pct_24h: f64,
    pub sparkline: Vec<f64>,
    /// Sparklines with fewer than 4 points draw as a dot or a misleading
    /// straight line, so the card renders a placeholder instead.
    pub plottable: bool,
}

/// Global market stats. Only the BTC dominance share is consumed today.
#[derive(Debug, Clone)]
pub struct GlobalStats {
    pub btc_dominance: f64,
}

impl GlobalStats {
    pub fn unavailable() -> Self {
        Self {
            btc_dominance: f64::NAN,
        }
    }
}

/// One exchange listing for a coin.
#[derive(Debug, Clone)]
pub struct ExchangeTicker {
    pub exchange: String,
    pub base: String,
    pub target: String,
    pub last_price: f64,
    pub volume_24h: f64,
    pub trust_score: Option<String>,
    pub trade_url: Option<String>,
}

impl ExchangeTicker {
    pub fn pair(&self) -> String {
        format!("{}/{}", self.base, self.target)
    }

    /// Trust buckets as a sortable score: green 3, yellow 2, red 1,
    /// anything else NaN.
    pub fn liquidity_score(&self) -> f64 {
        match self.trust_score.as_deref() {
            Some("green") => 3.0,
            Some("yellow") => 2.0,
            Some("red") => 1.0,
            _ => f64::NAN,
        }
    }
}

/// Sorted, deduplicated id list. Both the request and its cache key are
/// built from this, so `{bitcoin, ethereum}` and `{ethereum, bitcoin}`
/// resolve to the same upstream call and the same cache entry.
pub fn canonical_id_list(ids: &[&str]) -> Vec<String> {
    let mut list: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
    list.sort();
    list.dedup();
    list
}

/// Crypto market API client.
#[derive(Debug)]
pub struct CoinGeckoClient {
    http: Arc<FetchClient>,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(http: Arc<FetchClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Market snapshots for a set of coin ids.
    pub fn markets(
        &self,
        ids: &[&str],
        vs_currency: &str,
    ) -> Result<Vec<MarketSnapshot>, DataError> {
        let id_list = canonical_id_list(ids).join(",");
        let url = format!("{}/coins/markets", self.base_url);
        let params = [
            ("vs_currency", vs_currency.to_string()),
            ("ids", id_list.clone()),
            ("sparkline", "true".to_string()),
            ("price_change_percentage", "24h".to_string()),
        ];
        let payload = self.http.get_json(Provider::Crypto, &id_list, &url, &params)?;
        Ok(normalize_markets(&payload)?)
    }

    /// Price and market-cap history for one coin over `days` days.
    pub fn market_chart(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<CanonicalSeries, DataError> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, coin_id);
        let params = [
            ("vs_currency", vs_currency.to_string()),
            ("days", days.to_string()),
        ];
        let payload = self.http.get_json(Provider::Crypto, coin_id, &url, &params)?;
        let bars = normalize_market_chart(&payload)?;
        Ok(CanonicalSeries::new(Provider::Crypto, coin_id, bars))
    }

    pub fn global_stats(&self) -> Result<GlobalStats, DataError> {
        let url = format!("{}/global", self.base_url);
        let payload = self.http.get_json(Provider::Crypto, "global", &url, &[])?;
        Ok(normalize_global(&payload)?)
    }

    /// Exchange listings for one coin.
    pub fn tickers(&self, coin_id: &str) -> Result<Vec<ExchangeTicker>, DataError> {
        let url = format!("{}/coins/{}/tickers", self.base_url, coin_id);
        let payload = self.http.get_json(Provider::Crypto, coin_id, &url, &[])?;
        Ok(normalize_tickers(&payload)?)
    }
}

fn shape_err(endpoint: &str, expected: &str, got: &Value) -> NormalizeError {
    NormalizeError::UnrecognizedShape {
        provider: Provider::Crypto,
        detail: format!("{endpoint}: expected {expected}, got {}", value_kind(got)),
    }
}

/// Normalize a `/coins/markets` payload.
///
/// Rows that are not objects or carry no id are skipped; every other field
/// NaN-fills (or empties) independently.
pub fn normalize_markets(payload: &Value) -> Result<Vec<MarketSnapshot>, NormalizeError> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(map) if map.is_empty() => return Ok(Vec::new()),
        other => return Err(shape_err("coins/markets", "array", other)),
    };

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(obj) = row.as_object() else { continue };
        let Some(id) = obj.get("id").and_then(Value::as_str) else {
            continue;
        };
        let sparkline: Vec<f64> = obj
            .get("sparkline_in_7d")
            .and_then(|s| s.get("price"))
            .and_then(Value::as_array)
            .map(|points| points.iter().map(|p| p.as_f64().unwrap_or(f64::NAN)).collect())
            .unwrap_or_default();

        out.push(MarketSnapshot {
            id: id.to_string(),
            ticker: obj
                .get("symbol")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_uppercase(),
            name: obj
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(id)
                .to_string(),
            price: json_num(obj.get("current_price")),
            change_pct_24h: json_num(obj.get("price_change_percentage_24h")),
            plottable: sparkline.len() >= PLOTTABLE_MIN_POINTS,
            sparkline,
        });
    }
    Ok(out)
}

/// Normalize a `/coins/{id}/market_chart` payload.
///
/// `prices` rows drive the output and join against `market_caps` on exact
/// timestamp: a price without a matching cap gets a NaN cap, a cap without a
/// price row is dropped. Price rides in `close` and market cap in `volume`
/// (the only free canonical slot); open/high/low stay NaN. Timestamps are
/// epoch milliseconds and collapse to their UTC calendar date.
pub fn normalize_market_chart(payload: &Value) -> Result<Vec<CanonicalBar>, NormalizeError> {
    let obj = match payload {
        Value::Object(map) => map,
        Value::Array(rows) if rows.is_empty() => return Ok(Vec::new()),
        other => return Err(shape_err("market_chart", "object", other)),
    };

    let caps: HashMap<i64, f64> = obj
        .get("market_caps")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|pair| {
                    let ts = pair.get(0)?.as_f64()? as i64;
                    Some((ts, json_num(pair.get(1))))
                })
                .collect()
        })
        .unwrap_or_default();

    let mut bars = Vec::new();
    for pair in obj.get("prices").and_then(Value::as_array).into_iter().flatten() {
        let Some(ts) = pair.get(0).and_then(Value::as_f64) else {
            continue;
        };
        let ts_ms = ts as i64;
        let Some(date) = chrono::DateTime::from_timestamp_millis(ts_ms).map(|dt| dt.date_naive())
        else {
            continue;
        };
        let mut bar = CanonicalBar::void(date);
        bar.close = json_num(pair.get(1));
        bar.volume = caps.get(&ts_ms).copied().unwrap_or(f64::NAN);
        bars.push(bar);
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Normalize a `/global` payload down to the BTC dominance share.
pub fn normalize_global(payload: &Value) -> Result<GlobalStats, NormalizeError> {
    let obj = match payload {
        Value::Object(map) => map,
        Value::Array(rows) if rows.is_empty() => return Ok(GlobalStats::unavailable()),
        other => return Err(shape_err("global", "object", other)),
    };
    let btc_dominance = json_num(
        obj.get("data")
            .and_then(|d| d.get("market_cap_percentage"))
            .and_then(|m| m.get("btc")),
    );
    Ok(GlobalStats { btc_dominance })
}

/// Normalize a `/coins/{id}/tickers` payload.
pub fn normalize_tickers(payload: &Value) -> Result<Vec<ExchangeTicker>, NormalizeError> {
    let obj = match payload {
        Value::Object(map) => map,
        Value::Array(rows) if rows.is_empty() => return Ok(Vec::new()),
        other => return Err(shape_err("tickers", "object", other)),
    };

    let mut out = Vec::new();
    for row in obj.get("tickers").and_then(Value::as_array).into_iter().flatten() {
        let Some(t) = row.as_object() else { continue };
        out.push(ExchangeTicker {
            exchange: t
                .get("market")
                .and_then(|m| m.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            base: t.get("base").and_then(Value::as_str).unwrap_or("").to_string(),
            target: t
                .get("target")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            last_price: json_num(t.get("last")),
            volume_24h: json_num(t.get("volume")),
            trust_score: t.get("trust_score").and_then(Value::as_str).map(String::from),
            trade_url: t.get("trade_url").and_then(Value::as_str).map(String::from),
        });
    }
    Ok(out)
}
