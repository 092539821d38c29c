//! ETF constituent table and the sector rotation preset.

use serde::Serialize;
use std::collections::BTreeMap;

const TABLE: &[(&str, &[&str])] = &[
    ("XLF", &["BRK-B", "JPM", "BAC", "C", "WFC", "GS", "MS", "BLK", "CME", "V", "MA"]),
    ("XLE", &["XOM", "CVX", "SLB", "EOG", "MPC", "PSX", "VLO", "HAL", "COP", "FANG"]),
    ("XLK", &["AAPL", "MSFT", "NVDA", "AVGO", "ORCL", "CSCO", "AMD", "INTC", "QCOM", "TXN"]),
    ("XLC", &["META", "GOOGL", "GOOG", "NFLX", "DIS", "CMCSA", "VZ", "T", "CHTR", "EA"]),
    ("XLP", &["PG", "KO", "PEP", "WMT", "COST", "PM", "MDLZ", "CL", "STZ", "MNST"]),
    ("XLU", &["NEE", "DUK", "SO", "AEP", "SRE", "EXC", "XEL", "WEC", "ES", "ETR"]),
    ("XLV", &["UNH", "JNJ", "ABBV", "TMO", "ABT", "DHR", "PFE", "BMY", "AMGN", "GILD"]),
    ("XLI", &["RTX", "GE", "HON", "CAT", "DE", "EMR", "ETN", "ITW", "PH", "CMI"]),
    ("SMH", &["NVDA", "AVGO", "AMD", "INTC", "QCOM", "TXN", "AMAT", "LRCX", "KLAC", "MCHP"]),
    ("QQQ", &["AAPL", "MSFT", "AMZN", "NVDA", "META", "GOOGL", "GOOG", "TSLA", "AVGO", "COST"]),
    ("DIA", &["UNH", "GS", "HD", "MSFT", "CAT", "AMGN", "V", "TRV", "HON", "MCD"]),
    ("SPY", &["AAPL", "MSFT", "AMZN", "NVDA", "META", "GOOGL", "GOOG", "TSLA", "BRK-B", "UNH"]),
    ("SPMD", &["AAPL", "MSFT", "AMZN", "NVDA", "META", "GOOGL", "GOOG", "TSLA", "BRK-B", "UNH"]),
    ("IWM", &["AAPL", "MSFT", "AMZN", "NVDA", "META", "GOOGL", "GOOG", "TSLA", "BRK-B", "UNH"]),
];

const SECTOR_ROTATION_BENCHMARK: &str = "SPY";

const SECTOR_ROTATION: &[&str] = &[
    "QQQ", "DIA", "SPY", "SPMD", "IWM", "XLF", "XLE", "XLK", "XLC", "XLP", "XLU", "XLV", "XLI",
    "SMH",
];

/// Ticker list plus benchmark, ready to submit as a z-score request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub normalization_ticker: String,
    pub tickers: Vec<String>,
}

/// Immutable ETF → top holdings lookup. Built once at startup.
#[derive(Debug, Clone)]
pub struct EtfHoldings {
    table: BTreeMap<String, Vec<String>>,
}

impl EtfHoldings {
    /// The built-in table.
    pub fn builtin() -> Self {
        Self::from_entries(
            TABLE
                .iter()
                .map(|(etf, holdings)| (*etf, holdings.iter().map(|h| h.to_string()).collect())),
        )
    }

    /// Build from arbitrary entries. ETF symbols are stored upper-case.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<String>)>,
    {
        Self {
            table: entries
                .into_iter()
                .map(|(etf, holdings)| (etf.trim().to_uppercase(), holdings))
                .collect(),
        }
    }

    /// Constituents of `etf`, case-insensitive. Empty for unknown ETFs.
    pub fn holdings(&self, etf: &str) -> &[String] {
        self.table
            .get(&etf.trim().to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, etf: &str) -> bool {
        self.table.contains_key(&etf.trim().to_uppercase())
    }

    /// ETFs with known holdings, sorted.
    pub fn etfs(&self) -> Vec<&str> {
        self.table.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Broad index ETFs and the SPDR sectors, normalized by SPY.
    pub fn sector_rotation(&self) -> Preset {
        Preset {
            normalization_ticker: SECTOR_ROTATION_BENCHMARK.to_string(),
            tickers: SECTOR_ROTATION.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for EtfHoldings {
    fn default() -> Self {
        Self::builtin()
    }
}
