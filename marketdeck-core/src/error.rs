//! Structured error types for fetch, normalize, and config failures.
//!
//! Every variant is `Clone` because the cache fans one in-flight outcome out
//! to all waiters of that flight, errors included.

use crate::domain::Provider;
use thiserror::Error;

/// Transport and HTTP-level failures talking to a provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The provider never answered within the deadline. Refused and dropped
    /// connections land here too; the taxonomy has no separate kind for them.
    #[error("request to {provider} for '{symbol}' timed out")]
    Timeout { provider: Provider, symbol: String },

    #[error("{provider} returned HTTP {status} for '{symbol}'")]
    HttpStatus {
        provider: Provider,
        symbol: String,
        status: u16,
    },

    #[error("malformed {provider} response for '{symbol}': {detail}")]
    Malformed {
        provider: Provider,
        symbol: String,
        detail: String,
    },
}

/// Payload shape failures after a successful fetch.
///
/// Raised only when the top level of a payload is not a sequence or object
/// at all. Malformed rows inside a recognized shape are skipped or
/// NaN-filled by the normalizers, never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("unrecognized {provider} payload shape: {detail}")]
    UnrecognizedShape { provider: Provider, detail: String },
}

/// Configuration problems surfaced at call time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing API key for the daily quotes provider (set {env_var} or add api_key to the config file)")]
    MissingApiKey { env_var: &'static str },

    #[error("config file {path}: {detail}")]
    Invalid { path: String, detail: String },
}

/// Umbrella error for everything the data layer can produce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cache error: {0}")]
    Cache(String),
}
