//! Commodity futures history client (split-orient frame payloads).
//!
//! The history service returns a columnar frame: column labels, a date
//! index, and row-major data. Column labels arrive as plain strings, or as
//! two-level compound labels (["Close", "LE=F"]) when the upstream batches
//! multiple tickers; compound labels collapse to their first element.

use super::http::FetchClient;
use super::{json_num, value_kind};
use crate::domain::{CanonicalBar, CanonicalSeries, Provider};
use crate::error::{DataError, NormalizeError};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8700";

/// Futures history client.
#[derive(Debug)]
pub struct FuturesHistoryClient {
    http: Arc<FetchClient>,
    base_url: String,
}

impl FuturesHistoryClient {
    pub fn new(http: Arc<FetchClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Daily history for one futures ticker over an inclusive date range.
    pub fn history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CanonicalSeries, DataError> {
        let url = format!("{}/history", self.base_url);
        let params = [
            ("ticker", ticker.to_string()),
            ("start", start.to_string()),
            ("end", end.to_string()),
        ];
        let payload = self
            .http
            .get_json(Provider::Commodity, ticker, &url, &params)?;
        let bars = normalize_frame(&payload)?;
        Ok(CanonicalSeries::new(Provider::Commodity, ticker, bars))
    }
}

/// Collapse a column label to a single-level name: strings pass through,
/// compound (array) labels take their first element.
fn collapse_label(label: &Value) -> Option<String> {
    match label {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => parts.first().and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

/// Column positions for the OHLCV fields, matched case-insensitively.
/// Unrecognized columns (adj close and friends) are simply ignored.
#[derive(Debug, Default)]
struct ColumnMap {
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
}

impl ColumnMap {
    fn from_labels(labels: &[Value]) -> Self {
        let mut map = ColumnMap::default();
        for (i, label) in labels.iter().enumerate() {
            let Some(name) = collapse_label(label) else {
                continue;
            };
            match name.to_ascii_lowercase().as_str() {
                "open" => map.open = Some(i),
                "high" => map.high = Some(i),
                "low" => map.low = Some(i),
                "close" => map.close = Some(i),
                "volume" => map.volume = Some(i),
                _ => {}
            }
        }
        map
    }
}

/// Decode a frame index entry: epoch milliseconds, an ISO date string, or a
/// full timestamp whose first ten characters are the date.
fn index_date(entry: &Value) -> Option<NaiveDate> {
    match entry {
        Value::Number(n) => {
            let ms = n.as_f64()? as i64;
            chrono::DateTime::from_timestamp_millis(ms).map(|dt| dt.date_naive())
        }
        Value::String(s) => {
            let prefix = s.get(..10).unwrap_or(s);
            prefix.parse::<NaiveDate>().ok()
        }
        _ => None,
    }
}

/// Normalize a split-orient frame payload into canonical bars.
///
/// Missing OHLCV columns NaN-fill, short rows NaN-fill, and rows with an
/// undecodable index entry are skipped. An object without usable
/// columns/index/data members reads as an empty frame; only a top level
/// that is no object at all is a shape violation.
pub fn normalize_frame(payload: &Value) -> Result<Vec<CanonicalBar>, NormalizeError> {
    let obj = match payload {
        Value::Object(map) => map,
        Value::Array(rows) if rows.is_empty() => return Ok(Vec::new()),
        other => {
            return Err(NormalizeError::UnrecognizedShape {
                provider: Provider::Commodity,
                detail: format!("frame: expected object, got {}", value_kind(other)),
            })
        }
    };

    let empty: Vec<Value> = Vec::new();
    let columns = obj.get("columns").and_then(Value::as_array).unwrap_or(&empty);
    let index = obj.get("index").and_then(Value::as_array).unwrap_or(&empty);
    let data = obj.get("data").and_then(Value::as_array).unwrap_or(&empty);

    let map = ColumnMap::from_labels(columns);
    let mut bars = Vec::with_capacity(index.len());
    for (entry, row) in index.iter().zip(data.iter()) {
        let Some(date) = index_date(entry) else {
            continue;
        };
        let cells = row.as_array().map(Vec::as_slice).unwrap_or(&[]);
        let cell = |pos: Option<usize>| pos.map(|i| json_num(cells.get(i))).unwrap_or(f64::NAN);
        bars.push(CanonicalBar {
            date,
            open: cell(map.open),
            high: cell(map.high),
            low: cell(map.low),
            close: cell(map.close),
            volume: cell(map.volume),
        });
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}
