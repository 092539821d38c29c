//! Calendar alignment of per-ticker price series.
//!
//! The axis is the union of observed dates. A ticker without an observation
//! on an axis date gets `None` there: no forward fill, no interpolation.

use crate::error::EngineError;
use crate::types::{AlignedMatrix, PriceSeries, Ticker};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Align series onto a shared ascending date axis.
///
/// Fails with `EmptyInput` when `series` is empty or holds no observations.
pub fn align(series: &[PriceSeries]) -> Result<AlignedMatrix, EngineError> {
    if series.is_empty() {
        return Err(EngineError::EmptyInput("no price series to align".to_string()));
    }

    let axis: BTreeSet<NaiveDate> = series.iter().flat_map(|s| s.dates()).collect();
    if axis.is_empty() {
        return Err(EngineError::EmptyInput(
            "every price series is empty".to_string(),
        ));
    }
    let dates: Vec<NaiveDate> = axis.into_iter().collect();

    let mut columns: BTreeMap<Ticker, Vec<Option<f64>>> = BTreeMap::new();
    for s in series {
        let column = dates.iter().map(|date| s.price_on(*date)).collect();
        columns.insert(s.ticker().clone(), column);
    }

    Ok(drop_empty_rows(dates, columns))
}

/// Re-run alignment on an existing matrix. Yields the same axis and the same
/// missing pattern.
pub fn realign(matrix: &AlignedMatrix) -> Result<AlignedMatrix, EngineError> {
    align(&matrix.to_series())
}

/// Remove axis positions where no ticker has a value.
fn drop_empty_rows(
    dates: Vec<NaiveDate>,
    columns: BTreeMap<Ticker, Vec<Option<f64>>>,
) -> AlignedMatrix {
    let keep: Vec<bool> = (0..dates.len())
        .map(|i| columns.values().any(|c| c[i].is_some()))
        .collect();

    if keep.iter().all(|k| *k) {
        return AlignedMatrix::from_parts(dates, columns);
    }

    let dates = dates
        .into_iter()
        .zip(&keep)
        .filter_map(|(d, k)| k.then_some(d))
        .collect();
    let columns = columns
        .into_iter()
        .map(|(ticker, column)| {
            let column = column
                .into_iter()
                .zip(&keep)
                .filter_map(|(v, k)| k.then_some(v))
                .collect();
            (ticker, column)
        })
        .collect();

    AlignedMatrix::from_parts(dates, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn series(ticker: &str, points: &[(u32, f64)]) -> PriceSeries {
        PriceSeries::from_observations(
            Ticker::new(ticker).unwrap(),
            points.iter().map(|(day, p)| (d(*day), *p)),
        )
        .unwrap()
    }

    #[test]
    fn test_align_union_axis() {
        let matrix = align(&[
            series("AAPL", &[(1, 10.0), (3, 11.0)]),
            series("SPY", &[(1, 100.0), (2, 101.0), (3, 102.0)]),
        ])
        .unwrap();

        assert_eq!(matrix.dates(), &[d(1), d(2), d(3)]);
        let aapl = matrix.column(&Ticker::new("AAPL").unwrap()).unwrap();
        assert_eq!(aapl, &[Some(10.0), None, Some(11.0)]);
        assert_eq!(matrix.missing_count(), 1);
    }

    #[test]
    fn test_align_columns_match_axis_length() {
        let matrix = align(&[
            series("A", &[(1, 1.0)]),
            series("B", &[(4, 1.0)]),
            series("C", &[(2, 1.0), (9, 2.0)]),
        ])
        .unwrap();
        for (_, column) in matrix.columns() {
            assert_eq!(column.len(), matrix.len());
        }
        assert_eq!(matrix.len(), 4);
    }

    #[test]
    fn test_align_empty_input() {
        assert!(matches!(align(&[]), Err(EngineError::EmptyInput(_))));
    }

    #[test]
    fn test_align_all_series_empty() {
        let empty = PriceSeries::empty(Ticker::new("AAPL").unwrap());
        assert!(matches!(align(&[empty]), Err(EngineError::EmptyInput(_))));
    }

    #[test]
    fn test_align_keeps_empty_ticker_column() {
        let matrix = align(&[
            series("SPY", &[(1, 100.0)]),
            PriceSeries::empty(Ticker::new("NEW").unwrap()),
        ])
        .unwrap();
        let new = matrix.column(&Ticker::new("NEW").unwrap()).unwrap();
        assert_eq!(new, &[None]);
    }

    #[test]
    fn test_drop_empty_rows() {
        let mut columns = BTreeMap::new();
        columns.insert(Ticker::new("A").unwrap(), vec![Some(1.0), None, Some(3.0)]);
        columns.insert(Ticker::new("B").unwrap(), vec![None, None, Some(4.0)]);

        let matrix = drop_empty_rows(vec![d(1), d(2), d(3)], columns);
        assert_eq!(matrix.dates(), &[d(1), d(3)]);
        assert_eq!(
            matrix.column(&Ticker::new("B").unwrap()).unwrap(),
            &[None, Some(4.0)]
        );
    }

    #[test]
    fn test_realign_is_idempotent() {
        let matrix = align(&[
            series("AAPL", &[(1, 10.0), (3, 11.0), (6, 12.0)]),
            series("SPY", &[(1, 100.0), (2, 101.0), (3, 102.0)]),
        ])
        .unwrap();

        let again = realign(&matrix).unwrap();
        assert_eq!(again, matrix);
        assert_eq!(again.missing_count(), matrix.missing_count());
    }
}
