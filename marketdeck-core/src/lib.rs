//! MarketDeck Core — provider clients, canonical series, TTL cache, display metrics.
//!
//! This crate contains everything behind the dashboard:
//! - Canonical domain types (daily bars, series, symbol requests)
//! - Provider clients with pure JSON normalizers (crypto markets, sentiment
//!   index, daily quotes, futures history)
//! - TTL cache with single-flight miss coalescing
//! - Service layer with the degrade-to-empty policy
//! - Stateless display metrics and page view-models

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod session;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a frontend shares across threads is
    /// Send + Sync. The dashboard fans page builds out on rayon, so a type
    /// losing these bounds must break the build, not a render.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::CanonicalBar>();
        require_sync::<domain::CanonicalBar>();
        require_send::<domain::CanonicalSeries>();
        require_sync::<domain::CanonicalSeries>();
        require_send::<domain::Provider>();
        require_sync::<domain::Provider>();
        require_send::<domain::SymbolRequest>();
        require_sync::<domain::SymbolRequest>();
        require_send::<domain::TimeRange>();
        require_sync::<domain::TimeRange>();

        // Errors cross thread boundaries when a cache leader fans them out
        require_send::<error::FetchError>();
        require_sync::<error::FetchError>();
        require_send::<error::DataError>();
        require_sync::<error::DataError>();

        // Cache and service
        require_send::<data::TtlCache<domain::CanonicalSeries>>();
        require_sync::<data::TtlCache<domain::CanonicalSeries>>();
        require_send::<data::DataService>();
        require_sync::<data::DataService>();

        // View-models
        require_send::<dashboard::Dashboard>();
        require_sync::<dashboard::Dashboard>();
        require_send::<dashboard::CryptoPage>();
        require_sync::<dashboard::CryptoPage>();
        require_send::<dashboard::OverviewPage>();
        require_sync::<dashboard::OverviewPage>();
        require_send::<dashboard::QuotesPage>();
        require_sync::<dashboard::QuotesPage>();

        // Session
        require_send::<session::SessionState>();
        require_sync::<session::SessionState>();
    }
}
