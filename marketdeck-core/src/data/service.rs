//! Data service: per-operation TTL caches over the provider clients, with
//! fetch failures absorbed into empty values at this boundary.
//!
//! Absorption happens inside the cached compute, so the absorbed empty value
//! is what gets cached: a failing upstream is probed at most once per TTL
//! window, and every render in between sees the same degraded page instead
//! of a fresh error. A missing quotes API key is the one exception: it is
//! config state, not a fetch outcome, so it short-circuits before the cache
//! and never occupies a slot.

use super::alphavantage::{self, AlphaVantageClient};
use super::cache::{CacheKey, TtlCache};
use super::coingecko::{self, CoinGeckoClient, ExchangeTicker, GlobalStats, MarketSnapshot};
use super::futures::FuturesHistoryClient;
use super::http::FetchClient;
use super::sentiment::{SentimentClient, SentimentReading};
use crate::config::DeckConfig;
use crate::domain::{CanonicalSeries, Provider, SymbolRequest};
use crate::error::DataError;
use chrono::Utc;
use std::sync::{Arc, Once};

/// Shared, thread-safe entry point for every fetch the dashboard performs.
///
/// One cache instance per operation keeps entries from different operations
/// apart even when their (provider, symbol) pairs coincide.
#[derive(Debug)]
pub struct DataService {
    config: DeckConfig,
    coingecko: CoinGeckoClient,
    sentiment: SentimentClient,
    quotes: AlphaVantageClient,
    futures: FuturesHistoryClient,
    markets_cache: TtlCache<Vec<MarketSnapshot>>,
    chart_cache: TtlCache<CanonicalSeries>,
    daily_cache: TtlCache<CanonicalSeries>,
    futures_cache: TtlCache<CanonicalSeries>,
    global_cache: TtlCache<GlobalStats>,
    sentiment_cache: TtlCache<SentimentReading>,
    tickers_cache: TtlCache<Vec<ExchangeTicker>>,
    missing_key_warned: Once,
}

impl DataService {
    pub fn new(config: DeckConfig) -> Self {
        let http = Arc::new(FetchClient::new(config.request_timeout()));
        Self {
            coingecko: CoinGeckoClient::new(Arc::clone(&http), config.coingecko_base_url.clone()),
            sentiment: SentimentClient::new(Arc::clone(&http), config.sentiment_base_url.clone()),
            quotes: AlphaVantageClient::new(
                Arc::clone(&http),
                config.alphavantage_base_url.clone(),
                config.api_key.clone(),
            ),
            futures: FuturesHistoryClient::new(http, config.futures_base_url.clone()),
            markets_cache: TtlCache::new(),
            chart_cache: TtlCache::new(),
            daily_cache: TtlCache::new(),
            futures_cache: TtlCache::new(),
            global_cache: TtlCache::new(),
            sentiment_cache: TtlCache::new(),
            tickers_cache: TtlCache::new(),
            missing_key_warned: Once::new(),
            config,
        }
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    /// Whether the key-gated quotes source can serve at all. Pages use this
    /// to surface the degradation instead of showing silently empty tables.
    pub fn has_quotes_key(&self) -> bool {
        self.quotes.has_api_key()
    }

    /// Market snapshots for a set of coin ids (order-insensitive).
    pub fn market_cards(&self, ids: &[&str]) -> Vec<MarketSnapshot> {
        let canonical = coingecko::canonical_id_list(ids);
        let key = CacheKey::new(
            Provider::Crypto,
            "markets",
            &(&canonical, &self.config.vs_currency),
        );
        self.markets_cache
            .resolve(key, self.config.crypto_ttl(), || {
                let refs: Vec<&str> = canonical.iter().map(String::as_str).collect();
                Ok(self
                    .coingecko
                    .markets(&refs, &self.config.vs_currency)
                    .unwrap_or_else(|err| {
                        self.warn_absorbed(&err, Provider::Crypto, "markets");
                        Vec::new()
                    }))
            })
            .unwrap_or_default()
    }

    /// Price/market-cap chart for one coin over `days` days.
    pub fn coin_chart(&self, coin_id: &str, days: u32) -> CanonicalSeries {
        let vs_currency = self.config.vs_currency.clone();
        self.chart_resolve(coin_id, &vs_currency, days)
    }

    fn chart_resolve(&self, coin_id: &str, vs_currency: &str, days: u32) -> CanonicalSeries {
        let key = CacheKey::new(Provider::Crypto, coin_id, &(vs_currency, days));
        self.chart_cache
            .resolve(key, self.config.crypto_ttl(), || {
                Ok(self.absorb_series(
                    Provider::Crypto,
                    coin_id,
                    self.coingecko.market_chart(coin_id, vs_currency, days),
                ))
            })
            .unwrap_or_else(|_| CanonicalSeries::empty(Provider::Crypto, coin_id))
    }

    pub fn global_stats(&self) -> GlobalStats {
        let key = CacheKey::new(Provider::Crypto, "global", &());
        self.global_cache
            .resolve(key, self.config.crypto_ttl(), || {
                Ok(self.coingecko.global_stats().unwrap_or_else(|err| {
                    self.warn_absorbed(&err, Provider::Crypto, "global");
                    GlobalStats::unavailable()
                }))
            })
            .unwrap_or_else(|_| GlobalStats::unavailable())
    }

    pub fn sentiment(&self) -> SentimentReading {
        let key = CacheKey::new(Provider::Crypto, "fear-greed", &());
        self.sentiment_cache
            .resolve(key, self.config.crypto_ttl(), || {
                Ok(self.sentiment.latest().unwrap_or_else(|err| {
                    self.warn_absorbed(&err, Provider::Crypto, "fear-greed");
                    SentimentReading::unavailable()
                }))
            })
            .unwrap_or_else(|_| SentimentReading::unavailable())
    }

    /// Exchange listings for one coin.
    pub fn exchange_tickers(&self, coin_id: &str) -> Vec<ExchangeTicker> {
        let key = CacheKey::new(Provider::Crypto, coin_id, &());
        self.tickers_cache
            .resolve(key, self.config.crypto_ttl(), || {
                Ok(self.coingecko.tickers(coin_id).unwrap_or_else(|err| {
                    self.warn_absorbed(&err, Provider::Crypto, coin_id);
                    Vec::new()
                }))
            })
            .unwrap_or_default()
    }

    /// Daily series from the key-gated quotes provider. The provider family
    /// of the result follows the symbol's route (BASE-USD is crypto).
    /// Without a key the result is empty and never enters the cache.
    pub fn daily_series(&self, symbol: &str) -> CanonicalSeries {
        let provider = if alphavantage::split_crypto_pair(symbol).is_some() {
            Provider::Crypto
        } else {
            Provider::Equity
        };
        if !self.has_quotes_key() {
            self.warn_missing_key(provider);
            return CanonicalSeries::empty(provider, symbol);
        }
        let key = CacheKey::new(provider, symbol, &());
        self.daily_cache
            .resolve(key, self.config.quotes_ttl(), || {
                Ok(self.absorb_series(provider, symbol, self.quotes.daily_series(symbol)))
            })
            .unwrap_or_else(|_| CanonicalSeries::empty(provider, symbol))
    }

    /// Futures history over an inclusive date range.
    pub fn futures_history(
        &self,
        ticker: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> CanonicalSeries {
        let key = CacheKey::new(Provider::Commodity, ticker, &(start, end));
        self.futures_cache
            .resolve(key, self.config.quotes_ttl(), || {
                Ok(self.absorb_series(
                    Provider::Commodity,
                    ticker,
                    self.futures.history(ticker, start, end),
                ))
            })
            .unwrap_or_else(|_| CanonicalSeries::empty(Provider::Commodity, ticker))
    }

    /// Resolve a provider-tagged request to its series operation.
    pub fn series(&self, req: &SymbolRequest) -> CanonicalSeries {
        let today = Utc::now().date_naive();
        let start = today - chrono::Duration::days(i64::from(req.window_days));
        match req.provider {
            Provider::Crypto => {
                let vs_currency = req
                    .vs_currency
                    .clone()
                    .unwrap_or_else(|| self.config.vs_currency.clone());
                self.chart_resolve(&req.symbol, &vs_currency, req.window_days)
            }
            // The quotes provider has no range parameters; the window is
            // applied client-side.
            Provider::Equity => self.daily_series(&req.symbol).clip(start, today),
            Provider::Commodity => self.futures_history(&req.symbol, start, today),
        }
    }

    fn absorb_series(
        &self,
        provider: Provider,
        symbol: &str,
        result: Result<CanonicalSeries, DataError>,
    ) -> CanonicalSeries {
        match result {
            Ok(series) => series,
            Err(err) => {
                self.warn_absorbed(&err, provider, symbol);
                CanonicalSeries::empty(provider, symbol)
            }
        }
    }

    fn warn_absorbed(&self, err: &DataError, provider: Provider, symbol: &str) {
        tracing::warn!(%provider, symbol, error = %err, "fetch failed; rendering empty data");
    }

    /// Config state, not a transient failure: one line per process is
    /// plenty.
    fn warn_missing_key(&self, provider: Provider) {
        self.missing_key_warned.call_once(|| {
            tracing::warn!(
                %provider,
                "daily quotes API key is not configured; quote sources render empty"
            );
        });
    }
}
