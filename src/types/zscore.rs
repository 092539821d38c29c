use crate::error::EngineError;
use crate::types::{DateRange, Ticker, ZScoreSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Window used for the mean and standard deviation of a relative series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZScoreWindow {
    /// Statistics over every defined value in the requested range.
    #[default]
    Full,
    /// Statistics over the trailing `n` defined values at each position.
    Rolling(usize),
}

impl FromStr for ZScoreWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("full") {
            return Ok(ZScoreWindow::Full);
        }
        match s.parse::<usize>() {
            Ok(n) if n >= 2 => Ok(ZScoreWindow::Rolling(n)),
            Ok(n) => Err(format!("rolling window must be at least 2, got {}", n)),
            Err(_) => Err(format!("unknown z-score window '{}'", s)),
        }
    }
}

impl fmt::Display for ZScoreWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZScoreWindow::Full => f.write_str("full"),
            ZScoreWindow::Rolling(n) => write!(f, "{}", n),
        }
    }
}

/// What to emit for the normalization ticker when the caller lists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationOutput {
    /// 0.0 wherever the normalization ticker has a price, null elsewhere.
    #[default]
    Zeros,
    /// Leave it out of the output.
    Omit,
}

impl FromStr for NormalizationOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zeros" | "zero" => Ok(NormalizationOutput::Zeros),
            "omit" | "filter" => Ok(NormalizationOutput::Omit),
            other => Err(format!("unknown normalization output '{}'", other)),
        }
    }
}

impl fmt::Display for NormalizationOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationOutput::Zeros => f.write_str("zeros"),
            NormalizationOutput::Omit => f.write_str("omit"),
        }
    }
}

/// Engine policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnginePolicy {
    pub window: ZScoreWindow,
    pub normalization_output: NormalizationOutput,
}

/// Incoming z-score request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZScoreRequest {
    pub tickers: Vec<String>,
    pub normalization_ticker: String,
    pub start_date: String,
    pub end_date: String,
}

/// Validated form of a [`ZScoreRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineQuery {
    pub tickers: Vec<Ticker>,
    pub normalization_ticker: Ticker,
    pub range: DateRange,
}

impl ZScoreRequest {
    /// Validate the request. The range is checked first so an inverted range
    /// is reported even when the ticker list is also bad.
    pub fn validate(&self) -> Result<EngineQuery, EngineError> {
        let range = DateRange::parse(&self.start_date, &self.end_date)?;
        let normalization_ticker = Ticker::new(&self.normalization_ticker).map_err(|_| {
            EngineError::EmptyInput("normalization ticker must be non-empty".to_string())
        })?;

        let mut tickers: Vec<Ticker> = Vec::with_capacity(self.tickers.len());
        for raw in &self.tickers {
            let ticker = Ticker::new(raw)?;
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
        if tickers.is_empty() {
            return Err(EngineError::EmptyInput("no tickers requested".to_string()));
        }

        Ok(EngineQuery {
            tickers,
            normalization_ticker,
            range,
        })
    }
}

/// Engine output: date axis plus one z-score series per output ticker.
///
/// Tickers keep request order.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResult {
    dates: Vec<NaiveDate>,
    series: Vec<(Ticker, ZScoreSeries)>,
}

impl EngineResult {
    pub fn new(dates: Vec<NaiveDate>, series: Vec<(Ticker, ZScoreSeries)>) -> Self {
        debug_assert!(series.iter().all(|(_, s)| s.len() == dates.len()));
        Self { dates, series }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.series.iter().map(|(t, _)| t)
    }

    pub fn series(&self) -> &[(Ticker, ZScoreSeries)] {
        &self.series
    }

    pub fn get(&self, ticker: &str) -> Option<&ZScoreSeries> {
        self.series
            .iter()
            .find(|(t, _)| t.as_str() == ticker)
            .map(|(_, s)| s)
    }

    /// Wire form with ISO dates.
    pub fn to_response(&self) -> ZScoreResponse {
        self.map_values(|z| z)
    }

    /// Wire form with every defined value passed through `f`.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> ZScoreResponse {
        ZScoreResponse {
            dates: self
                .dates
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect(),
            zscores: self
                .series
                .iter()
                .map(|(t, s)| {
                    (
                        t.as_str().to_string(),
                        s.values().iter().map(|v| v.map(&f)).collect(),
                    )
                })
                .collect(),
        }
    }
}

/// JSON response body: `{ dates: [...], zscores: { ticker: [number|null] } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreResponse {
    pub dates: Vec<String>,
    pub zscores: BTreeMap<String, Vec<Option<f64>>>,
}
