//! Yahoo Finance API client for historical stock data.
//!
//! Uses the unofficial v8 chart endpoint with explicit `period1`/`period2`
//! bounds and daily bars.

use crate::error::EngineError;
use crate::sources::PriceSeriesFetcher;
use crate::types::{DateRange, PriceSeries, Ticker};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
    #[serde(default)]
    adjclose: Option<Vec<YahooAdjClose>>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

/// Normalize symbol for Yahoo Finance API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B)
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.to_uppercase().replace('.', "-")
}

/// Exchange-local calendar date of a bar timestamp.
fn bar_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + gmtoffset, 0).map(|dt| dt.date_naive())
}

/// Turn a decoded chart payload into a price series for `ticker`.
///
/// Null closes are gaps. Bars outside `range` are dropped.
fn parse_chart(
    ticker: &Ticker,
    range: &DateRange,
    data: YahooChartResponse,
    use_adjusted_close: bool,
) -> Result<PriceSeries, EngineError> {
    if let Some(error) = data.chart.error {
        return Err(EngineError::unavailable(format!(
            "Yahoo API error for {}: {} - {}",
            ticker, error.code, error.description
        )));
    }

    let result = data
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| EngineError::unavailable(format!("No results for {}", ticker)))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let gmtoffset = result.meta.gmtoffset.unwrap_or(0);

    let adjusted = if use_adjusted_close {
        result
            .indicators
            .adjclose
            .and_then(|a| a.into_iter().next())
            .and_then(|a| a.adjclose)
    } else {
        None
    };
    let closes = match adjusted {
        Some(values) => values,
        None => result
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|q| q.close)
            .unwrap_or_default(),
    };

    let mut observations = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        let Some(date) = bar_date(timestamp, gmtoffset) else {
            continue;
        };
        if range.contains(date) {
            observations.push((date, close));
        }
    }

    if observations.is_empty() {
        return Err(EngineError::unavailable(format!(
            "No observations for {} in {}",
            ticker, range
        )));
    }

    PriceSeries::from_observations(ticker.clone(), observations)
}

/// Yahoo Finance API client.
#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    use_adjusted_close: bool,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client. `request_timeout` bounds each HTTP call.
    pub fn new(
        base_url: impl Into<String>,
        use_adjusted_close: bool,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            use_adjusted_close,
        })
    }

    fn chart_url(&self, ticker: &Ticker, range: &DateRange) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&includePrePost=false&events=div%2Csplit",
            self.base_url,
            normalize_yahoo_symbol(ticker.as_str()),
            range.start_timestamp(),
            range.end_exclusive_timestamp()
        )
    }
}

#[async_trait]
impl PriceSeriesFetcher for YahooFinanceClient {
    async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, EngineError> {
        let url = self.chart_url(ticker, range);
        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::transient(format!("Request for {} failed: {}", ticker, e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(EngineError::transient(format!(
                "Yahoo API error for {}: {}",
                ticker, status
            )));
        }

        // 404 bodies still carry a chart.error payload worth reporting
        let data: YahooChartResponse = match response.json().await {
            Ok(data) => data,
            Err(e) if status.is_success() => {
                return Err(EngineError::unavailable(format!(
                    "Parse error for {}: {}",
                    ticker, e
                )))
            }
            Err(_) => {
                return Err(EngineError::unavailable(format!(
                    "Yahoo API error for {}: {}",
                    ticker, status
                )))
            }
        };

        let series = parse_chart(ticker, range, data, self.use_adjusted_close)?;
        debug!("{}: {} daily closes", ticker, series.len());
        Ok(series)
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
