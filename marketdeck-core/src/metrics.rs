//! Display metrics: pure, stateless aggregations computed fresh per render.
//!
//! Nothing here is cached; every function is a cheap fold over series the
//! caches already hold. All of them follow the canonical NaN conventions:
//! missing inputs yield NaN outputs, never panics.

use crate::domain::{CanonicalBar, CanonicalSeries};

/// Field selector for bar-level aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl BarField {
    fn of(self, bar: &CanonicalBar) -> f64 {
        match self {
            BarField::Open => bar.open,
            BarField::High => bar.high,
            BarField::Low => bar.low,
            BarField::Close => bar.close,
            BarField::Volume => bar.volume,
        }
    }
}

/// Percent change between the last two closes.
///
/// NaN when fewer than two bars exist or the base close is 0 or NaN. This
/// is presentation data, so NaN (rendered as a dash) beats an infinity.
pub fn percent_change(series: &CanonicalSeries) -> f64 {
    let n = series.bars.len();
    if n < 2 {
        return f64::NAN;
    }
    let last = series.bars[n - 1].close;
    let prev = series.bars[n - 2].close;
    if prev == 0.0 || prev.is_nan() {
        return f64::NAN;
    }
    (last - prev) / prev * 100.0
}

/// NaN-skipping (min, max) over one field. (NaN, NaN) when the series is
/// empty or the field is NaN throughout.
pub fn min_max(series: &CanonicalSeries, field: BarField) -> (f64, f64) {
    let mut min = f64::NAN;
    let mut max = f64::NAN;
    for bar in &series.bars {
        let v = field.of(bar);
        if v.is_nan() {
            continue;
        }
        if min.is_nan() || v < min {
            min = v;
        }
        if max.is_nan() || v > max {
            max = v;
        }
    }
    (min, max)
}

/// Headline figures for one asset panel.
#[derive(Debug, Clone, Copy)]
pub struct Kpis {
    /// Highest traded value (max high) over the window.
    pub highest_value: f64,
    /// Lowest traded value (min low).
    pub lowest_value: f64,
    pub highest_close: f64,
    pub lowest_close: f64,
}

pub fn kpis(series: &CanonicalSeries) -> Kpis {
    let (_, highest_value) = min_max(series, BarField::High);
    let (lowest_value, _) = min_max(series, BarField::Low);
    let (lowest_close, highest_close) = min_max(series, BarField::Close);
    Kpis {
        highest_value,
        lowest_value,
        highest_close,
        lowest_close,
    }
}

/// Last close plus the move from the bar before it.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    pub current_price: f64,
    pub percent_change: f64,
}

pub fn snapshot(series: &CanonicalSeries) -> Snapshot {
    Snapshot {
        current_price: series.last_close(),
        percent_change: percent_change(series),
    }
}

/// Per-row share of total volume, in percent.
///
/// NaN rows keep NaN shares and are excluded from the total. When the total
/// is zero every share is 0.0, not NaN: an all-zero column reads as "no
/// volume anywhere", which is the truth.
pub fn volume_share_percent(volumes: &[f64]) -> Vec<f64> {
    let total: f64 = volumes.iter().filter(|v| !v.is_nan()).sum();
    volumes
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else if total == 0.0 {
                0.0
            } else {
                v / total * 100.0
            }
        })
        .collect()
}

/// Per-bar trading range (high minus low) in bar order.
pub fn volatility(series: &CanonicalSeries) -> Vec<f64> {
    series.bars.iter().map(|b| b.range()).collect()
}

/// Altcoin-season approximation: whatever market share BTC doesn't hold.
/// NaN dominance propagates.
pub fn altcoin_season_approx(btc_dominance: f64) -> f64 {
    100.0 - btc_dominance
}

/// Chart color rule: up when the window's last close is at or above its
/// first. NaN endpoints and empty series read as down.
pub fn trend_is_up(series: &CanonicalSeries) -> bool {
    let (Some(first), Some(last)) = (series.bars.first(), series.bars.last()) else {
        return false;
    };
    last.close - first.close >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Provider;
    use chrono::NaiveDate;

    fn series_of(closes: &[f64]) -> CanonicalSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let mut bar = CanonicalBar::void(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                );
                bar.close = close;
                bar
            })
            .collect();
        CanonicalSeries::new(Provider::Crypto, "test", bars)
    }

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn percent_change_last_two_closes() {
        // (110 - 100) / 100 * 100 = 10%
        assert_approx(percent_change(&series_of(&[90.0, 100.0, 110.0])), 10.0);
    }

    #[test]
    fn percent_change_needs_two_bars() {
        assert!(percent_change(&series_of(&[])).is_nan());
        assert!(percent_change(&series_of(&[100.0])).is_nan());
    }

    #[test]
    fn percent_change_guards_zero_and_nan_base() {
        assert!(percent_change(&series_of(&[0.0, 10.0])).is_nan());
        assert!(percent_change(&series_of(&[f64::NAN, 10.0])).is_nan());
        // NaN last close propagates through the arithmetic.
        assert!(percent_change(&series_of(&[10.0, f64::NAN])).is_nan());
    }

    #[test]
    fn min_max_skips_nan() {
        let mut series = series_of(&[5.0, 9.0, 3.0]);
        series.bars[1].close = f64::NAN;
        let (min, max) = min_max(&series, BarField::Close);
        assert_eq!((min, max), (3.0, 5.0));
    }

    #[test]
    fn min_max_empty_and_all_nan_is_nan_pair() {
        let (min, max) = min_max(&series_of(&[]), BarField::Close);
        assert!(min.is_nan() && max.is_nan());

        let (min, max) = min_max(&series_of(&[1.0, 2.0]), BarField::Open);
        assert!(min.is_nan() && max.is_nan(), "open is NaN throughout");
    }

    #[test]
    fn kpis_read_the_right_fields() {
        let mut series = series_of(&[10.0, 20.0, 15.0]);
        for (i, (high, low)) in [(12.0, 8.0), (25.0, 18.0), (16.0, 14.0)].iter().enumerate() {
            series.bars[i].high = *high;
            series.bars[i].low = *low;
        }
        let k = kpis(&series);
        assert_eq!(k.highest_value, 25.0);
        assert_eq!(k.lowest_value, 8.0);
        assert_eq!(k.highest_close, 20.0);
        assert_eq!(k.lowest_close, 10.0);
    }

    #[test]
    fn snapshot_is_last_close_plus_move() {
        let snap = snapshot(&series_of(&[100.0, 110.0]));
        assert_eq!(snap.current_price, 110.0);
        assert_approx(snap.percent_change, 10.0);
    }

    #[test]
    fn volume_share_sums_to_hundred() {
        let shares = volume_share_percent(&[2.0, 3.0, 5.0]);
        assert_eq!(shares, vec![20.0, 30.0, 50.0]);
    }

    #[test]
    fn volume_share_all_zero_is_all_zero() {
        assert_eq!(volume_share_percent(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn volume_share_keeps_nan_rows_out_of_the_total() {
        let shares = volume_share_percent(&[f64::NAN, 25.0, 75.0]);
        assert!(shares[0].is_nan());
        assert_eq!(shares[1], 25.0);
        assert_eq!(shares[2], 75.0);
    }

    #[test]
    fn volatility_is_high_minus_low_per_bar() {
        let mut series = series_of(&[1.0, 2.0]);
        series.bars[0].high = 10.0;
        series.bars[0].low = 7.0;
        let vol = volatility(&series);
        assert_eq!(vol[0], 3.0);
        assert!(vol[1].is_nan());
    }

    #[test]
    fn altcoin_season_complements_dominance() {
        assert_approx(altcoin_season_approx(54.3), 45.7);
        assert!(altcoin_season_approx(f64::NAN).is_nan());
    }

    #[test]
    fn trend_compares_window_endpoints() {
        assert!(trend_is_up(&series_of(&[100.0, 90.0, 101.0])));
        assert!(trend_is_up(&series_of(&[100.0, 100.0])), "flat reads as up");
        assert!(!trend_is_up(&series_of(&[100.0, 99.0])));
        assert!(!trend_is_up(&series_of(&[f64::NAN, 99.0])));
        assert!(!trend_is_up(&series_of(&[])));
    }
}
