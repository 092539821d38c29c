use crate::types::{EnginePolicy, NormalizationOutput, ZScoreWindow};
use crate::sources::yahoo::DEFAULT_BASE_URL;
use std::env;
use std::time::Duration;

/// Price provider and fetch pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Yahoo Finance base URL.
    pub yahoo_base_url: String,
    /// Prefer adjusted close over raw close.
    pub use_adjusted_close: bool,
    /// Max concurrent fetches per request (at least 1).
    pub concurrency: usize,
    /// Per-fetch timeout in seconds.
    pub timeout_secs: u64,
    /// Retry attempts for transport failures.
    pub retries: u32,
    /// Base retry backoff in ms, doubled per attempt.
    pub retry_backoff_ms: u64,
    /// Fetch cache TTL in seconds (0 = disabled).
    pub cache_ttl_secs: u64,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Budget for one provider attempt: the fetch timeout split evenly
    /// across the first try and every retry.
    pub fn attempt_timeout(&self) -> Duration {
        self.timeout() / (self.retries.saturating_add(1))
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// `None` when caching is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: DEFAULT_BASE_URL.to_string(),
            use_adjusted_close: true,
            concurrency: 4,
            timeout_secs: 30,
            retries: 2,
            retry_backoff_ms: 250,
            cache_ttl_secs: 300,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Fetch pipeline settings.
    pub fetch: FetchConfig,
    /// Z-score window and normalization ticker output.
    pub policy: EnginePolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Missing or
    /// unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = FetchConfig::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(default)
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            fetch: FetchConfig {
                yahoo_base_url: lookup("YAHOO_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.yahoo_base_url),
                use_adjusted_close: flag("USE_ADJUSTED_CLOSE", defaults.use_adjusted_close),
                concurrency: lookup("FETCH_CONCURRENCY")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(defaults.concurrency)
                    .max(1),
                timeout_secs: lookup("FETCH_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.timeout_secs),
                retries: lookup("FETCH_RETRIES")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.retries),
                retry_backoff_ms: lookup("RETRY_BACKOFF_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.retry_backoff_ms),
                cache_ttl_secs: lookup("CACHE_TTL_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.cache_ttl_secs),
            },
            policy: EnginePolicy {
                window: lookup("ZSCORE_WINDOW")
                    .and_then(|v| v.parse::<ZScoreWindow>().ok())
                    .unwrap_or_default(),
                normalization_output: lookup("NORMALIZATION_OUTPUT")
                    .and_then(|v| v.parse::<NormalizationOutput>().ok())
                    .unwrap_or_default(),
            },
        }
    }

    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    // =========================================================================
    // Defaults Tests
    // =========================================================================

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.fetch.yahoo_base_url, DEFAULT_BASE_URL);
        assert!(config.fetch.use_adjusted_close);
        assert_eq!(config.fetch.concurrency, 4);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.fetch.retries, 2);
        assert_eq!(config.fetch.retry_backoff(), Duration::from_millis(250));
        assert_eq!(config.fetch.cache_ttl(), Some(Duration::from_secs(300)));
        assert_eq!(config.policy, EnginePolicy::default());
    }

    #[test]
    fn test_attempt_timeout_splits_budget() {
        let fetch = FetchConfig {
            timeout_secs: 30,
            retries: 2,
            ..FetchConfig::default()
        };
        assert_eq!(fetch.attempt_timeout(), Duration::from_secs(10));

        let fetch = FetchConfig {
            retries: 0,
            ..fetch
        };
        assert_eq!(fetch.attempt_timeout(), fetch.timeout());
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(Config::default().bind_addr(), "0.0.0.0:3001");
    }

    // =========================================================================
    // Overrides Tests
    // =========================================================================

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("YAHOO_BASE_URL", "http://localhost:9000/"),
            ("USE_ADJUSTED_CLOSE", "false"),
            ("FETCH_CONCURRENCY", "8"),
            ("CACHE_TTL_SECS", "0"),
            ("ZSCORE_WINDOW", "20"),
            ("NORMALIZATION_OUTPUT", "omit"),
        ]));

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.fetch.yahoo_base_url, "http://localhost:9000");
        assert!(!config.fetch.use_adjusted_close);
        assert_eq!(config.fetch.concurrency, 8);
        assert_eq!(config.fetch.cache_ttl(), None);
        assert_eq!(config.policy.window, ZScoreWindow::Rolling(20));
        assert_eq!(config.policy.normalization_output, NormalizationOutput::Omit);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "not-a-port"),
            ("FETCH_TIMEOUT_SECS", "-5"),
            ("ZSCORE_WINDOW", "1"),
            ("NORMALIZATION_OUTPUT", "sometimes"),
        ]));

        assert_eq!(config.port, 3001);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.policy.window, ZScoreWindow::Full);
        assert_eq!(config.policy.normalization_output, NormalizationOutput::Zeros);
    }

    #[test]
    fn test_concurrency_minimum() {
        let config = Config::from_lookup(lookup(&[("FETCH_CONCURRENCY", "0")]));
        assert_eq!(config.fetch.concurrency, 1);
    }
}
