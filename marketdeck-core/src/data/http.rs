//! Shared blocking HTTP client with the fetch error mapping.
//!
//! One client, one timeout, no retries. The TTL cache bounds call frequency,
//! so a failing upstream is re-probed at most once per TTL window.

use crate::domain::Provider;
use crate::error::FetchError;
use std::time::Duration;

const USER_AGENT: &str = concat!("marketdeck/", env!("CARGO_PKG_VERSION"));

/// Blocking JSON fetcher shared by every provider client.
#[derive(Debug)]
pub struct FetchClient {
    client: reqwest::blocking::Client,
}

impl FetchClient {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// GET `url` with query params and decode the body as JSON.
    ///
    /// Timeouts and refused connections map to `Timeout`, non-2xx statuses
    /// to `HttpStatus`, and undecodable bodies to `Malformed`. Shape checks
    /// on the decoded value belong to the normalizers, not to this layer.
    pub fn get_json(
        &self,
        provider: Provider,
        symbol: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, FetchError> {
        let resp = self.client.get(url).query(params).send().map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                FetchError::Timeout {
                    provider,
                    symbol: symbol.to_string(),
                }
            } else {
                FetchError::Malformed {
                    provider,
                    symbol: symbol.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                provider,
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        resp.json().map_err(|e| FetchError::Malformed {
            provider,
            symbol: symbol.to_string(),
            detail: e.to_string(),
        })
    }
}
