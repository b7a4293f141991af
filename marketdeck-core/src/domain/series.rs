//! Canonical series: ordered daily bars plus fetch provenance.

use super::bar::CanonicalBar;
use super::request::Provider;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Minimum number of points before a line chart is worth drawing.
pub const PLOTTABLE_MIN_POINTS: usize = 4;

/// Sorted daily bars for one (provider, symbol) pair.
///
/// Construction sorts ascending by date with a stable sort, so normalizing
/// an already-normalized payload is a no-op and sub-daily points that
/// collapse onto one calendar date keep their payload order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalSeries {
    pub provider: Provider,
    pub symbol: String,
    pub fetched_at: DateTime<Utc>,
    pub bars: Vec<CanonicalBar>,
}

impl CanonicalSeries {
    pub fn new(provider: Provider, symbol: impl Into<String>, mut bars: Vec<CanonicalBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self {
            provider,
            symbol: symbol.into(),
            fetched_at: Utc::now(),
            bars,
        }
    }

    /// The well-formed "no data" value every failure path degrades to.
    pub fn empty(provider: Provider, symbol: impl Into<String>) -> Self {
        Self::new(provider, symbol, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn is_plottable(&self) -> bool {
        self.bars.len() >= PLOTTABLE_MIN_POINTS
    }

    /// Inclusive date-window filter, provenance preserved.
    pub fn clip(&self, start: NaiveDate, end: NaiveDate) -> CanonicalSeries {
        let bars = self
            .bars
            .iter()
            .copied()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        CanonicalSeries {
            provider: self.provider,
            symbol: self.symbol.clone(),
            fetched_at: self.fetched_at,
            bars,
        }
    }

    /// Close column in bar order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Last close, NaN when the series is empty.
    pub fn last_close(&self) -> f64 {
        self.bars.last().map(|b| b.close).unwrap_or(f64::NAN)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(y: i32, m: u32, d: u32, close: f64) -> CanonicalBar {
        let mut b = CanonicalBar::void(NaiveDate::from_ymd_opt(y, m, d).unwrap());
        b.close = close;
        b
    }

    #[test]
    fn construction_sorts_ascending_by_date() {
        let s = CanonicalSeries::new(
            Provider::Crypto,
            "bitcoin",
            vec![bar(2024, 1, 3, 3.0), bar(2024, 1, 1, 1.0), bar(2024, 1, 2, 2.0)],
        );
        assert_eq!(s.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(s.first_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(s.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn sorting_already_sorted_bars_is_a_noop() {
        let sorted = vec![bar(2024, 1, 1, 1.0), bar(2024, 1, 2, 2.0)];
        let once = CanonicalSeries::new(Provider::Equity, "AAPL", sorted);
        let twice = CanonicalSeries::new(Provider::Equity, "AAPL", once.bars.clone());
        let dates_once: Vec<_> = once.bars.iter().map(|b| b.date).collect();
        let dates_twice: Vec<_> = twice.bars.iter().map(|b| b.date).collect();
        assert_eq!(dates_once, dates_twice);
    }

    #[test]
    fn clip_is_inclusive_on_both_ends() {
        let s = CanonicalSeries::new(
            Provider::Commodity,
            "GC=F",
            vec![
                bar(2024, 1, 1, 1.0),
                bar(2024, 1, 2, 2.0),
                bar(2024, 1, 3, 3.0),
                bar(2024, 1, 4, 4.0),
            ],
        );
        let clipped = s.clip(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        );
        assert_eq!(clipped.closes(), vec![2.0, 3.0]);
        assert_eq!(clipped.symbol, "GC=F");
    }

    #[test]
    fn plottable_needs_four_points() {
        let three = CanonicalSeries::new(
            Provider::Crypto,
            "bitcoin",
            (1..=3).map(|d| bar(2024, 1, d, d as f64)).collect(),
        );
        let four = CanonicalSeries::new(
            Provider::Crypto,
            "bitcoin",
            (1..=4).map(|d| bar(2024, 1, d, d as f64)).collect(),
        );
        assert!(!three.is_plottable());
        assert!(four.is_plottable());
    }

    #[test]
    fn empty_series_has_nan_last_close() {
        let s = CanonicalSeries::empty(Provider::Equity, "MSFT");
        assert!(s.is_empty());
        assert!(s.last_close().is_nan());
        assert_eq!(s.first_date(), None);
    }
}
