//! TTL cache in front of another price source.

use crate::error::EngineError;
use crate::services::Cache;
use crate::sources::PriceSeriesFetcher;
use crate::types::{DateRange, PriceSeries, Ticker};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Serves repeated (ticker, range) requests from memory. Errors are never cached.
///
/// Expired entries are swept on every insert, so keys that are never read
/// again do not accumulate.
pub struct CachedFetcher {
    inner: Arc<dyn PriceSeriesFetcher>,
    cache: Cache<(Ticker, DateRange), Arc<PriceSeries>>,
}

impl CachedFetcher {
    pub fn new(inner: Arc<dyn PriceSeriesFetcher>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::new(ttl),
        }
    }

    pub fn cache(&self) -> &Cache<(Ticker, DateRange), Arc<PriceSeries>> {
        &self.cache
    }
}

#[async_trait]
impl PriceSeriesFetcher for CachedFetcher {
    async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, EngineError> {
        let key = (ticker.clone(), *range);
        if let Some(series) = self.cache.get(&key) {
            debug!("Cache hit for {} {}", ticker, range);
            return Ok(series.as_ref().clone());
        }

        let series = self.inner.fetch(ticker, range).await?;
        self.cache.purge_expired();
        self.cache.insert(key, Arc::new(series.clone()));
        Ok(series)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
