//! Z-score engine: fetch, align, normalize.

use crate::error::EngineError;
use crate::services::aligner::align;
use crate::services::relative::relative_strength;
use crate::services::zscore::zscore_with_window;
use crate::sources::PriceSeriesFetcher;
use crate::types::{
    DateRange, EnginePolicy, EngineQuery, EngineResult, NormalizationOutput, PriceSeries,
    Ticker, ZScoreRequest, ZScoreSeries,
};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default number of fetches in flight per request.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;
/// Default per-fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one z-score request end to end.
///
/// Holds no per-request state; a single engine is shared by every handler.
pub struct ZScoreEngine {
    fetcher: Arc<dyn PriceSeriesFetcher>,
    policy: EnginePolicy,
    fetch_concurrency: usize,
    fetch_timeout: Duration,
}

impl ZScoreEngine {
    pub fn new(fetcher: Arc<dyn PriceSeriesFetcher>) -> Self {
        Self {
            fetcher,
            policy: EnginePolicy::default(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: EnginePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Max concurrent fetches. Clamped to at least 1.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.fetch_concurrency = limit.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn policy(&self) -> EnginePolicy {
        self.policy
    }

    /// Name of the underlying price provider.
    pub fn provider(&self) -> &'static str {
        self.fetcher.name()
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    /// Validate a raw request body, then run it.
    pub async fn run_request(&self, request: &ZScoreRequest) -> Result<EngineResult, EngineError> {
        let query = request.validate()?;
        self.run(&query).await
    }

    /// Compute z-scored relative strength for `query.tickers`.
    ///
    /// Fails with the first error hit; no partial results.
    pub async fn run(&self, query: &EngineQuery) -> Result<EngineResult, EngineError> {
        if query.tickers.is_empty() {
            return Err(EngineError::EmptyInput("no tickers requested".to_string()));
        }
        let norm = &query.normalization_ticker;

        info!(
            "Running z-score for {} ticker(s) against {} over {}",
            query.tickers.len(),
            norm,
            query.range
        );

        let series = self.fetch_all(&query.tickers, norm, &query.range).await?;
        let matrix = align(&series)?;
        let relative = relative_strength(&matrix, norm)?;

        let mut output: Vec<(Ticker, ZScoreSeries)> = Vec::with_capacity(query.tickers.len());
        for ticker in &query.tickers {
            if ticker == norm {
                if self.policy.normalization_output == NormalizationOutput::Zeros {
                    let column = matrix.column(norm).ok_or_else(|| {
                        EngineError::UnknownNormalizationTicker(norm.to_string())
                    })?;
                    let zeros = column.iter().map(|v| v.map(|_| 0.0)).collect();
                    output.push((ticker.clone(), ZScoreSeries::new(zeros)));
                }
                continue;
            }

            let rel = relative.get(ticker).ok_or_else(|| {
                EngineError::unavailable(format!("no aligned prices for {}", ticker))
            })?;
            let z = zscore_with_window(rel, self.policy.window).map_err(|e| e.context(ticker))?;
            output.push((ticker.clone(), z));
        }

        if output.is_empty() {
            return Err(EngineError::InsufficientSamples(format!(
                "{} normalized against itself is a constant series",
                norm
            )));
        }

        info!(
            "Z-score complete: {} dates, {} series, {} missing cells",
            matrix.len(),
            output.len(),
            matrix.missing_count()
        );

        Ok(EngineResult::new(matrix.dates().to_vec(), output))
    }

    /// Fetch every ticker plus the normalization ticker, at most
    /// `fetch_concurrency` at a time. The first failure drops the rest.
    async fn fetch_all(
        &self,
        tickers: &[Ticker],
        norm: &Ticker,
        range: &DateRange,
    ) -> Result<Vec<PriceSeries>, EngineError> {
        let mut wanted: Vec<&Ticker> = tickers.iter().collect();
        if !wanted.contains(&norm) {
            wanted.push(norm);
        }

        let fetches: Vec<_> = wanted
            .into_iter()
            .map(|ticker| self.fetch_one(ticker, range))
            .collect();

        stream::iter(fetches)
            .buffer_unordered(self.fetch_concurrency)
            .try_collect()
            .await
    }

    async fn fetch_one(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, EngineError> {
        let series = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(ticker, range))
            .await
            .map_err(|_| {
                EngineError::transient(format!(
                    "{} fetch for {} timed out after {:?}",
                    self.fetcher.name(),
                    ticker,
                    self.fetch_timeout
                ))
            })??;

        if series.is_empty() {
            return Err(EngineError::unavailable(format!(
                "No observations for {} in {}",
                ticker, range
            )));
        }

        debug!("Fetched {} prices for {} from {}", series.len(), ticker, self.fetcher.name());
        Ok(series)
    }
}
