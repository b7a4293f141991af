//! Property tests for canonical-series and metric invariants.
//!
//! Uses proptest to verify:
//! 1. Ordering — constructed series are always date-ascending, and
//!    re-normalizing changes nothing
//! 2. Volume shares — finite shares sum to ~100, or are all zero
//! 3. Min/max — the bounds bound every finite sample and are attained
//! 4. Percent change — matches the closed form on the last two closes
//! 5. Time ranges — every label round-trips through FromStr

use chrono::NaiveDate;
use marketdeck_core::domain::{CanonicalBar, CanonicalSeries, Provider, TimeRange};
use marketdeck_core::metrics::{min_max, percent_change, volume_share_percent, BarField};
use proptest::prelude::*;

// ── Strategies ───────────────────────────────────────────────────────

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2015, 1, 1).unwrap() + chrono::Duration::days(offset)
    })
}

/// Prices with a NaN sprinkled in: the canonical model treats NaN as an
/// ordinary cell value, so every property must survive it.
fn arb_field() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => 0.01..100_000.0_f64,
        1 => Just(f64::NAN),
    ]
}

fn arb_bar() -> impl Strategy<Value = CanonicalBar> {
    (arb_date(), arb_field(), arb_field(), arb_field(), arb_field(), arb_field()).prop_map(
        |(date, open, high, low, close, volume)| CanonicalBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        },
    )
}

fn arb_series() -> impl Strategy<Value = CanonicalSeries> {
    proptest::collection::vec(arb_bar(), 0..64)
        .prop_map(|bars| CanonicalSeries::new(Provider::Crypto, "prop", bars))
}

// ── 1. Ordering ──────────────────────────────────────────────────────

proptest! {
    /// Bars always come out ascending, whatever order the payload had.
    #[test]
    fn series_bars_are_always_ascending(series in arb_series()) {
        for pair in series.bars.windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
        }
    }

    /// Normalizing an already-normalized series is a no-op (stable sort).
    #[test]
    fn renormalizing_a_series_changes_nothing(series in arb_series()) {
        let again = CanonicalSeries::new(series.provider, series.symbol.as_str(), series.bars.clone());
        prop_assert_eq!(again.bars.len(), series.bars.len());
        for (a, b) in again.bars.iter().zip(&series.bars) {
            prop_assert_eq!(a.date, b.date);
            // Bit-level equality keeps NaN cells comparable.
            prop_assert_eq!(a.close.to_bits(), b.close.to_bits());
            prop_assert_eq!(a.volume.to_bits(), b.volume.to_bits());
        }
    }
}

// ── 2. Volume shares ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn finite_volume_shares_sum_to_hundred_or_all_zero(
        volumes in proptest::collection::vec(
            prop_oneof![
                3 => 0.0..1.0e9_f64,
                1 => Just(f64::NAN),
            ],
            1..32,
        )
    ) {
        let shares = volume_share_percent(&volumes);
        prop_assert_eq!(shares.len(), volumes.len());

        // NaN rows stay NaN no matter what the rest of the column holds.
        for (v, s) in volumes.iter().zip(&shares) {
            prop_assert_eq!(v.is_nan(), s.is_nan());
        }

        let finite_total: f64 = volumes.iter().filter(|v| !v.is_nan()).sum();
        if finite_total == 0.0 {
            for s in shares.iter().filter(|s| !s.is_nan()) {
                prop_assert_eq!(*s, 0.0);
            }
        } else {
            let share_sum: f64 = shares.iter().filter(|s| !s.is_nan()).sum();
            prop_assert!(
                (share_sum - 100.0).abs() < 1e-6,
                "shares summed to {} instead of 100", share_sum
            );
        }
    }
}

// ── 3. Min/max bounds ────────────────────────────────────────────────

proptest! {
    #[test]
    fn min_max_bounds_every_finite_close_and_is_attained(series in arb_series()) {
        let (min, max) = min_max(&series, BarField::Close);
        let finite: Vec<f64> = series
            .bars
            .iter()
            .map(|b| b.close)
            .filter(|c| !c.is_nan())
            .collect();

        if finite.is_empty() {
            prop_assert!(min.is_nan() && max.is_nan());
        } else {
            prop_assert!(min <= max);
            for c in &finite {
                prop_assert!(min <= *c && *c <= max);
            }
            prop_assert!(finite.contains(&min), "min must be a sample");
            prop_assert!(finite.contains(&max), "max must be a sample");
        }
    }
}

// ── 4. Percent change ────────────────────────────────────────────────

proptest! {
    #[test]
    fn percent_change_matches_closed_form(
        closes in proptest::collection::vec(0.01..1.0e6_f64, 2..32)
    ) {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars: Vec<CanonicalBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let mut bar = CanonicalBar::void(base + chrono::Duration::days(i as i64));
                bar.close = close;
                bar
            })
            .collect();
        let series = CanonicalSeries::new(Provider::Equity, "prop", bars);

        let prev = closes[closes.len() - 2];
        let last = closes[closes.len() - 1];
        let expected = (last - prev) / prev * 100.0;
        let change = percent_change(&series);
        prop_assert!(
            (change - expected).abs() <= expected.abs() * 1e-12 + 1e-9,
            "got {}, expected {}", change, expected
        );
    }
}

// ── 5. Time range labels ─────────────────────────────────────────────

#[test]
fn every_time_range_label_round_trips() {
    for range in TimeRange::ALL {
        let parsed: TimeRange = range.label().parse().unwrap();
        assert_eq!(parsed, range);
    }
    // The crypto page historically advertised "7D" for the weekly window.
    assert_eq!("7D".parse::<TimeRange>().unwrap(), TimeRange::Week);
}
