//! Price series providers.
//!
//! Every provider implements [`PriceSeriesFetcher`]. Decorators in this module
//! (retry, cache) wrap any other fetcher so the engine only ever sees the
//! trait object.

pub mod cached;
pub mod memory;
pub mod retry;
pub mod yahoo;

pub use cached::CachedFetcher;
pub use memory::InMemoryFetcher;
pub use retry::RetryingFetcher;
pub use yahoo::YahooFinanceClient;

use crate::config::FetchConfig;
use crate::error::EngineError;
use crate::types::{DateRange, PriceSeries, Ticker};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Source of daily closing prices.
///
/// A `DateRange` cannot be inverted, so `RangeInvalid` is raised when the
/// range is built, before any fetch. Implementations return `DataUnavailable`
/// for unknown tickers and for ranges with no observations, and never return
/// an empty series.
#[async_trait]
pub trait PriceSeriesFetcher: Send + Sync {
    async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, EngineError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}

/// Production fetch chain: Yahoo, then retry, then the TTL cache when enabled.
///
/// Each provider attempt gets `attempt_timeout`, so a hung request leaves
/// room in the engine's fetch timeout for the retries.
pub fn build_fetcher(config: &FetchConfig) -> Result<Arc<dyn PriceSeriesFetcher>, reqwest::Error> {
    let yahoo = YahooFinanceClient::new(
        config.yahoo_base_url.clone(),
        config.use_adjusted_close,
        config.attempt_timeout(),
    )?;
    let mut fetcher: Arc<dyn PriceSeriesFetcher> = Arc::new(yahoo);

    if config.retries > 0 {
        let retrying = RetryingFetcher::new(fetcher, config.retries, config.retry_backoff())
            .with_attempt_timeout(config.attempt_timeout());
        fetcher = Arc::new(retrying);
    }

    match config.cache_ttl() {
        Some(ttl) => {
            info!("Price cache enabled (ttl {:?})", ttl);
            fetcher = Arc::new(CachedFetcher::new(fetcher, ttl));
        }
        None => info!("Price cache disabled"),
    }

    Ok(fetcher)
}
