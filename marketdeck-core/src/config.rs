//! Dashboard configuration: API key, timeouts, TTLs, and provider base URLs.
//!
//! Loaded from an optional TOML file with the API key overridable from the
//! environment. Defaults work with zero configuration; the key-gated quotes
//! source then degrades with a warning instead of failing the page.

use crate::data::{alphavantage, coingecko, futures, sentiment};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Daily quotes API key. `None` leaves that source degraded.
    pub api_key: Option<String>,
    pub vs_currency: String,
    pub request_timeout_secs: u64,
    /// TTL for the crypto endpoints (markets, charts, global, sentiment,
    /// tickers).
    pub crypto_ttl_secs: u64,
    /// TTL for daily quotes and futures history. Longer than the crypto TTL
    /// because those upstreams meter requests much more tightly.
    pub quotes_ttl_secs: u64,
    pub coingecko_base_url: String,
    pub sentiment_base_url: String,
    pub alphavantage_base_url: String,
    pub futures_base_url: String,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            vs_currency: "usd".into(),
            request_timeout_secs: 20,
            crypto_ttl_secs: 300,
            quotes_ttl_secs: 600,
            coingecko_base_url: coingecko::DEFAULT_BASE_URL.into(),
            sentiment_base_url: sentiment::DEFAULT_BASE_URL.into(),
            alphavantage_base_url: alphavantage::DEFAULT_BASE_URL.into(),
            futures_base_url: futures::DEFAULT_BASE_URL.into(),
        }
    }
}

impl DeckConfig {
    /// Load from a TOML file, then apply the environment override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        let mut config = Self::from_toml(&content).map_err(|detail| ConfigError::Invalid {
            path: path.display().to_string(),
            detail,
        })?;
        config.apply_env();
        Ok(config)
    }

    /// Parse from a TOML string. Missing fields take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Defaults plus the environment override.
    pub fn load_default() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// A non-empty `ALPHAVANTAGE_API_KEY` beats whatever the file says.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(alphavantage::API_KEY_ENV_VAR) {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn crypto_ttl(&self) -> Duration {
        Duration::from_secs(self.crypto_ttl_secs)
    }

    pub fn quotes_ttl(&self) -> Duration {
        Duration::from_secs(self.quotes_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_zero_config() {
        let config = DeckConfig::default();
        assert_eq!(config.api_key, None);
        assert_eq!(config.request_timeout_secs, 20);
        assert_eq!(config.crypto_ttl_secs, 300);
        assert_eq!(config.quotes_ttl_secs, 600);
        assert_eq!(config.vs_currency, "usd");
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let config = DeckConfig::from_toml(
            r#"
            api_key = "demo"
            crypto_ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("demo"));
        assert_eq!(config.crypto_ttl_secs, 60);
        assert_eq!(config.quotes_ttl_secs, 600);
    }

    #[test]
    fn garbage_toml_is_an_error() {
        assert!(DeckConfig::from_toml("api_key = [not toml").is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let config = DeckConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed = DeckConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.coingecko_base_url, config.coingecko_base_url);
        assert_eq!(parsed.request_timeout_secs, config.request_timeout_secs);
    }

    #[test]
    fn from_file_reads_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("marketdeck.toml");
        std::fs::write(&path, "crypto_ttl_secs = 120\nvs_currency = \"eur\"\n").unwrap();

        let config = DeckConfig::from_file(&path).unwrap();
        assert_eq!(config.crypto_ttl_secs, 120);
        assert_eq!(config.vs_currency, "eur");
    }

    #[test]
    fn missing_file_is_an_invalid_config_error() {
        let tmp = TempDir::new().unwrap();
        let err = DeckConfig::from_file(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
