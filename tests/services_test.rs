//! Unit tests for services module

use chrono::NaiveDate;
use market_dynamics::error::EngineError;
use market_dynamics::services::zscore::mean_and_std;
use market_dynamics::services::*;
use market_dynamics::types::*;
use std::time::Duration;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
}

fn t(s: &str) -> Ticker {
    Ticker::new(s).unwrap()
}

fn series(ticker: &str, points: &[(u32, f64)]) -> PriceSeries {
    PriceSeries::from_observations(t(ticker), points.iter().map(|(day, p)| (d(*day), *p)))
        .unwrap()
}

// =========================================================================
// Cache
// =========================================================================

#[test]
fn test_cache_insert_and_get() {
    let cache: Cache<String, String> = Cache::new(Duration::from_secs(60));

    cache.insert("key1".to_string(), "value1".to_string());
    assert_eq!(cache.get(&"key1".to_string()), Some("value1".to_string()));
    assert_eq!(cache.get(&"key2".to_string()), None);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 1);
}

#[test]
fn test_cache_expiration() {
    let cache: Cache<String, String> = Cache::new(Duration::from_millis(10));

    cache.insert("key1".to_string(), "value1".to_string());
    assert_eq!(cache.get(&"key1".to_string()), Some("value1".to_string()));

    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(cache.get(&"key1".to_string()), None);
}

// =========================================================================
// Alignment + relative strength
// =========================================================================

#[test]
fn test_fully_defined_pair_has_no_gaps() {
    let matrix = align(&[
        series("AAPL", &[(1, 10.0), (2, 11.0), (5, 12.0)]),
        series("SPY", &[(1, 100.0), (2, 101.0), (5, 99.0)]),
    ])
    .unwrap();

    let rel = relative_strength(&matrix, &t("SPY")).unwrap();
    assert_eq!(rel[&t("AAPL")].defined_count(), 3);
    assert!(zscore(&rel[&t("AAPL")]).is_ok());
}

#[test]
fn test_missing_date_is_null_and_axis_kept() {
    let matrix = align(&[
        series("AAPL", &[(1, 10.0), (3, 12.0)]),
        series("SPY", &[(1, 100.0), (2, 100.0), (3, 100.0)]),
    ])
    .unwrap();

    assert_eq!(matrix.dates(), &[d(1), d(2), d(3)]);
    let rel = relative_strength(&matrix, &t("SPY")).unwrap();
    let z = zscore(&rel[&t("AAPL")]).unwrap();
    assert_eq!(z.len(), 3);
    assert_eq!(z.get(1), None);
}

#[test]
fn test_alignment_idempotent() {
    let matrix = align(&[
        series("A", &[(1, 1.0), (4, 2.0)]),
        series("B", &[(2, 3.0), (4, 4.0)]),
        series("C", &[(3, 5.0)]),
    ])
    .unwrap();

    let again = realign(&matrix).unwrap();
    assert_eq!(again.dates(), matrix.dates());
    assert_eq!(again.missing_count(), matrix.missing_count());
}

// =========================================================================
// Z-score
// =========================================================================

#[test]
fn test_zscore_standardizes() {
    let rel = RelativeSeries::new(vec![Some(0.5), Some(0.7), Some(0.4), None, Some(0.9)]);
    let z = zscore(&rel).unwrap();
    let defined: Vec<f64> = z.defined().collect();
    let (mean, std) = mean_and_std(&defined).unwrap();
    assert!(mean.abs() < 1e-9);
    assert!((std - 1.0).abs() < 1e-9);
}

#[test]
fn test_zscore_constant_is_insufficient() {
    let rel = RelativeSeries::new(vec![Some(0.25); 10]);
    assert!(matches!(
        zscore(&rel),
        Err(EngineError::InsufficientSamples(_))
    ));
}

#[test]
fn test_rolling_zscore_keeps_shape() {
    let rel = RelativeSeries::new(vec![Some(1.0), None, Some(2.0), Some(4.0), Some(3.0)]);
    let z = zscore_with_window(&rel, ZScoreWindow::Rolling(3)).unwrap();
    assert_eq!(z.len(), 5);
    assert_eq!(z.get(0), None);
    assert_eq!(z.get(1), None);
    assert!(z.get(4).is_some());
}

// =========================================================================
// Rating
// =========================================================================

#[test]
fn test_rating_properties() {
    assert!((rating(0.0) - 50.0).abs() < 1e-4);
    assert!(rating(1.0) > rating(0.5));
    assert!((rating(2.0) + rating(-2.0) - 100.0).abs() < 1e-6);
    assert!((cum_prob(1.0) - 0.841345).abs() < 1e-5);
}

// =========================================================================
// Export + holdings
// =========================================================================

#[test]
fn test_csv_export_rounding() {
    let result = EngineResult::new(
        vec![d(1), d(2)],
        vec![(t("AAPL"), ZScoreSeries::new(vec![Some(0.12345), None]))],
    );
    assert_eq!(to_csv_all(&result), "Date,AAPL\n2024-02-01,0.123\n2024-02-02,");
}

#[test]
fn test_etf_holdings_lookup() {
    let holdings = EtfHoldings::builtin();
    assert_eq!(holdings.holdings("xle")[0], "XOM");
    assert!(holdings.holdings("ZZZ").is_empty());
    assert_eq!(holdings.sector_rotation().normalization_ticker, "SPY");
}
