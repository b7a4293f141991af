//! Canonical bar: the normalization target every provider payload maps onto.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar with NaN standing in for every missing numeric field.
///
/// `high >= low` is intentionally not enforced: providers occasionally emit
/// violations, and consumers are required to tolerate them the same way they
/// tolerate NaN.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CanonicalBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl CanonicalBar {
    /// All-NaN bar for a date with no usable fields.
    pub fn void(date: NaiveDate) -> Self {
        Self {
            date,
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            volume: f64::NAN,
        }
    }

    /// Returns true if every numeric field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            && self.high.is_nan()
            && self.low.is_nan()
            && self.close.is_nan()
            && self.volume.is_nan()
    }

    /// Per-bar trading range (high minus low), NaN-propagating.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
