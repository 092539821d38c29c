//! Time series containers passed between engine stages.
//!
//! Each stage builds a fresh value and hands it on; nothing here is mutated
//! after construction.

use crate::error::EngineError;
use crate::types::Ticker;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// A single daily observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Ascending, duplicate-free daily prices for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: Ticker,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from raw provider observations in any order.
    ///
    /// Later observations for the same date replace earlier ones. Any price
    /// that is not positive and finite fails with `InvalidPrice`.
    pub fn from_observations<I>(ticker: Ticker, observations: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (date, price) in observations {
            if !price.is_finite() || price <= 0.0 {
                return Err(EngineError::InvalidPrice(format!(
                    "{} has price {} on {}",
                    ticker, price, date
                )));
            }
            by_date.insert(date, price);
        }

        let points = by_date
            .into_iter()
            .map(|(date, price)| PricePoint { date, price })
            .collect();

        Ok(Self { ticker, points })
    }

    pub fn empty(ticker: Ticker) -> Self {
        Self {
            ticker,
            points: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Exact-date lookup.
    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].price)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Shared date axis plus one positional column of optional prices per ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedMatrix {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<Ticker, Vec<Option<f64>>>,
}

impl AlignedMatrix {
    /// Caller guarantees every column has `dates.len()` entries.
    pub(crate) fn from_parts(dates: Vec<NaiveDate>, columns: BTreeMap<Ticker, Vec<Option<f64>>>) -> Self {
        debug_assert!(columns.values().all(|c| c.len() == dates.len()));
        Self { dates, columns }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.columns.keys()
    }

    pub fn column(&self, ticker: &Ticker) -> Option<&[Option<f64>]> {
        self.columns.get(ticker).map(Vec::as_slice)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&Ticker, &[Option<f64>])> {
        self.columns.iter().map(|(t, c)| (t, c.as_slice()))
    }

    /// Number of axis positions where `ticker` has a price.
    pub fn defined_count(&self, ticker: &Ticker) -> usize {
        self.column(ticker)
            .map(|c| c.iter().filter(|v| v.is_some()).count())
            .unwrap_or(0)
    }

    /// Total number of missing cells across all columns.
    pub fn missing_count(&self) -> usize {
        self.columns
            .values()
            .map(|c| c.iter().filter(|v| v.is_none()).count())
            .sum()
    }

    /// Recover per-ticker series from the matrix, dropping missing cells.
    pub fn to_series(&self) -> Vec<PriceSeries> {
        self.columns
            .iter()
            .map(|(ticker, column)| PriceSeries {
                ticker: ticker.clone(),
                points: self
                    .dates
                    .iter()
                    .zip(column)
                    .filter_map(|(date, price)| {
                        price.map(|price| PricePoint { date: *date, price })
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Positional series of optional values over an axis.
macro_rules! axis_series {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(transparent)]
        pub struct $name(Vec<Option<f64>>);

        impl $name {
            pub fn new(values: Vec<Option<f64>>) -> Self {
                Self(values)
            }

            pub fn values(&self) -> &[Option<f64>] {
                &self.0
            }

            pub fn into_values(self) -> Vec<Option<f64>> {
                self.0
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Defined values only, in axis order.
            pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
                self.0.iter().filter_map(|v| *v)
            }

            pub fn defined_count(&self) -> usize {
                self.0.iter().filter(|v| v.is_some()).count()
            }

            pub fn get(&self, index: usize) -> Option<f64> {
                self.0.get(index).copied().flatten()
            }
        }
    };
}

axis_series!(
    /// `price(t) / price(normalization)` per axis position.
    RelativeSeries
);

axis_series!(
    /// Standardized relative strength per axis position.
    ZScoreSeries
);

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn t(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    // =========================================================================
    // PriceSeries Tests
    // =========================================================================

    #[test]
    fn test_price_series_sorts_and_dedupes_last_wins() {
        let series = PriceSeries::from_observations(
            t("AAPL"),
            vec![(d(3), 12.0), (d(1), 10.0), (d(3), 13.0), (d(2), 11.0)],
        )
        .unwrap();

        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
        assert_eq!(series.price_on(d(3)), Some(13.0));
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_price_series_rejects_non_positive() {
        let err = PriceSeries::from_observations(t("AAPL"), vec![(d(1), 0.0)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPrice(_)));

        let err = PriceSeries::from_observations(t("AAPL"), vec![(d(1), -4.0)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPrice(_)));
    }

    #[test]
    fn test_price_series_rejects_non_finite() {
        let err = PriceSeries::from_observations(t("AAPL"), vec![(d(1), f64::NAN)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPrice(_)));

        let err =
            PriceSeries::from_observations(t("AAPL"), vec![(d(1), f64::INFINITY)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPrice(_)));
    }

    #[test]
    fn test_price_on_missing_date() {
        let series = PriceSeries::from_observations(t("SPY"), vec![(d(1), 1.0), (d(5), 2.0)]).unwrap();
        assert_eq!(series.price_on(d(3)), None);
        assert_eq!(series.first_date(), Some(d(1)));
        assert_eq!(series.last_date(), Some(d(5)));
    }

    // =========================================================================
    // Axis series Tests
    // =========================================================================

    #[test]
    fn test_relative_series_defined() {
        let series = RelativeSeries::new(vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.defined_count(), 2);
        assert_eq!(series.defined().collect::<Vec<_>>(), vec![1.0, 3.0]);
        assert_eq!(series.get(1), None);
        assert_eq!(series.get(2), Some(3.0));
        assert_eq!(series.get(9), None);
    }

    #[test]
    fn test_zscore_series_serializes_nulls() {
        let series = ZScoreSeries::new(vec![Some(0.5), None]);
        assert_eq!(serde_json::to_string(&series).unwrap(), "[0.5,null]");
    }
}
