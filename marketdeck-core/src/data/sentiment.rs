//! Crypto fear/greed sentiment index client (alternative.me-compatible).

use super::http::FetchClient;
use super::{json_num_lenient, value_kind};
use crate::domain::Provider;
use crate::error::{DataError, NormalizeError};
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://api.alternative.me";

/// Latest index reading: 0 (extreme fear) to 100 (extreme greed).
#[derive(Debug, Clone)]
pub struct SentimentReading {
    pub value: f64,
    pub classification: String,
}

impl SentimentReading {
    pub fn unavailable() -> Self {
        Self {
            value: f64::NAN,
            classification: String::new(),
        }
    }
}

/// Sentiment index client.
#[derive(Debug)]
pub struct SentimentClient {
    http: Arc<FetchClient>,
    base_url: String,
}

impl SentimentClient {
    pub fn new(http: Arc<FetchClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn latest(&self) -> Result<SentimentReading, DataError> {
        let url = format!("{}/fng/", self.base_url);
        let params = [("limit", "1".to_string())];
        let payload = self
            .http
            .get_json(Provider::Crypto, "fear-greed", &url, &params)?;
        Ok(normalize_sentiment(&payload)?)
    }
}

/// Normalize an `/fng/` payload. The index quotes its numeric value as a
/// string ("72"), so the lenient parser applies; an empty `data` array reads
/// as an unavailable (NaN) reading.
pub fn normalize_sentiment(payload: &Value) -> Result<SentimentReading, NormalizeError> {
    let obj = match payload {
        Value::Object(map) => map,
        Value::Array(rows) if rows.is_empty() => return Ok(SentimentReading::unavailable()),
        other => {
            return Err(NormalizeError::UnrecognizedShape {
                provider: Provider::Crypto,
                detail: format!("fng: expected object, got {}", value_kind(other)),
            })
        }
    };

    let Some(first) = obj
        .get("data")
        .and_then(Value::as_array)
        .and_then(|rows| rows.first())
    else {
        return Ok(SentimentReading::unavailable());
    };

    Ok(SentimentReading {
        value: json_num_lenient(first.get("value")),
        classification: first
            .get("value_classification")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    })
}
