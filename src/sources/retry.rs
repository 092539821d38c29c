//! Retry with exponential backoff around another price source.

use crate::error::EngineError;
use crate::sources::PriceSeriesFetcher;
use crate::types::{DateRange, PriceSeries, Ticker};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Retries transient `DataUnavailable` failures only. "No data" and every
/// other error kind are returned immediately.
///
/// With an attempt timeout set, an attempt that overruns it counts as a
/// transient failure and is retried like any other.
pub struct RetryingFetcher {
    inner: Arc<dyn PriceSeriesFetcher>,
    max_retries: u32,
    base_backoff: Duration,
    attempt_timeout: Option<Duration>,
}

impl RetryingFetcher {
    pub fn new(inner: Arc<dyn PriceSeriesFetcher>, max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff,
            attempt_timeout: None,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    async fn attempt(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, EngineError> {
        let Some(limit) = self.attempt_timeout else {
            return self.inner.fetch(ticker, range).await;
        };
        tokio::time::timeout(limit, self.inner.fetch(ticker, range))
            .await
            .map_err(|_| {
                EngineError::transient(format!(
                    "{} attempt for {} timed out after {:?}",
                    self.inner.name(),
                    ticker,
                    limit
                ))
            })?
    }

    /// Delay before retry number `attempt` (0-based): base * 2^attempt.
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(1u32 << attempt.min(16))
    }
}

#[async_trait]
impl PriceSeriesFetcher for RetryingFetcher {
    async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, EngineError> {
        let mut attempt = 0;
        loop {
            match self.attempt(ticker, range).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "{} fetch for {} failed ({}), retry {}/{} in {:?}",
                        self.inner.name(),
                        ticker,
                        e,
                        attempt + 1,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
