//! Fixed in-memory price source.

use crate::error::EngineError;
use crate::sources::PriceSeriesFetcher;
use crate::types::{DateRange, PriceSeries, Ticker};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves preloaded observations, filtered to the requested range.
#[derive(Debug, Default)]
pub struct InMemoryFetcher {
    data: HashMap<Ticker, Vec<(NaiveDate, f64)>>,
    calls: AtomicUsize,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add observations for a ticker. Values are validated at fetch time.
    pub fn with_series(mut self, ticker: &str, observations: Vec<(NaiveDate, f64)>) -> Self {
        if let Ok(ticker) = Ticker::new(ticker) {
            self.data.entry(ticker).or_default().extend(observations);
        }
        self
    }

    /// Number of `fetch` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSeriesFetcher for InMemoryFetcher {
    async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let observations = self
            .data
            .get(ticker)
            .ok_or_else(|| EngineError::unavailable(format!("Unknown ticker {}", ticker)))?;

        let in_range: Vec<_> = observations
            .iter()
            .copied()
            .filter(|(date, _)| range.contains(*date))
            .collect();

        if in_range.is_empty() {
            return Err(EngineError::unavailable(format!(
                "No observations for {} in {}",
                ticker, range
            )));
        }

        PriceSeries::from_observations(ticker.clone(), in_range)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
