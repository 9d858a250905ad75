use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::error::ConfigError;
use crate::fetcher::DETAIL_TIMEOUT_SECS;
use crate::session::DEFAULT_TIMEOUT_SECS;

/// Default number of concurrent detail fetches.
pub const DEFAULT_WORKERS: usize = 8;

/// Listings page fetched by the command-line tool.
pub const DEFAULT_LISTINGS_URL: &str = "https://employment.ku.edu/jobs";

/// Enrichment configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentConfig {
    pub cache: CacheConfig,
    pub detail_timeout: Duration,
    pub listing_timeout: Duration,
    pub workers: usize,
    pub limit: Option<usize>,
    pub listings_url: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            detail_timeout: Duration::from_secs(DETAIL_TIMEOUT_SECS),
            listing_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            workers: DEFAULT_WORKERS,
            limit: None,
            listings_url: DEFAULT_LISTINGS_URL.to_string(),
        }
    }
}

impl EnrichmentConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64, _>(&lookup, "ENRICH_CACHE_TTL_SECS")? {
            config.cache.ttl = i64::try_from(secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "ENRICH_CACHE_TTL_SECS",
                    value: secs.to_string(),
                })?;
        }
        if let Some(max) = parse_var(&lookup, "ENRICH_CACHE_MAX_ENTRIES")? {
            config.cache.max_entries = max;
        }
        if let Some(secs) = parse_var(&lookup, "ENRICH_DETAIL_TIMEOUT_SECS")? {
            config.detail_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "ENRICH_LISTING_TIMEOUT_SECS")? {
            config.listing_timeout = Duration::from_secs(secs);
        }
        if let Some(workers) = parse_var(&lookup, "ENRICH_WORKERS")? {
            config.workers = workers;
        }
        config.limit = parse_var(&lookup, "ENRICH_LIMIT")?;
        if let Some(url) = lookup("ENRICH_LISTINGS_URL").filter(|u| !u.trim().is_empty()) {
            config.listings_url = url.trim().to_string();
        }

        Ok(config)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_detail_timeout(mut self, timeout: Duration) -> Self {
        self.detail_timeout = timeout;
        self
    }

    pub fn with_listings_url(mut self, url: impl Into<String>) -> Self {
        self.listings_url = url.into();
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = EnrichmentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EnrichmentConfig::default());
        assert_eq!(config.workers, 8);
        assert_eq!(config.cache.max_entries, 300);
        assert_eq!(config.cache.ttl, chrono::Duration::minutes(30));
        assert_eq!(config.detail_timeout, Duration::from_secs(12));
        assert_eq!(config.listing_timeout, Duration::from_secs(20));
        assert_eq!(config.limit, None);
    }

    #[test]
    fn test_overrides() {
        let config = EnrichmentConfig::from_lookup(lookup(&[
            ("ENRICH_CACHE_TTL_SECS", "60"),
            ("ENRICH_CACHE_MAX_ENTRIES", "10"),
            ("ENRICH_WORKERS", " 2 "),
            ("ENRICH_LIMIT", "5"),
            ("ENRICH_LISTINGS_URL", "http://localhost:8080/jobs"),
        ]))
        .unwrap();

        assert_eq!(config.cache.ttl, chrono::Duration::seconds(60));
        assert_eq!(config.cache.max_entries, 10);
        assert_eq!(config.workers, 2);
        assert_eq!(config.limit, Some(5));
        assert_eq!(config.listings_url, "http://localhost:8080/jobs");
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config =
            EnrichmentConfig::from_lookup(lookup(&[("ENRICH_WORKERS", ""), ("ENRICH_LIMIT", " ")]))
                .unwrap();
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.limit, None);
    }

    #[test]
    fn test_negative_ttl_is_rejected() {
        let err =
            EnrichmentConfig::from_lookup(lookup(&[("ENRICH_CACHE_TTL_SECS", "-5")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "ENRICH_CACHE_TTL_SECS", ref value } if value == "-5"
        ));
    }

    #[test]
    fn test_out_of_range_ttl_is_rejected() {
        for value in ["9223372036854775807", "18446744073709551615", "99999999999999999999"] {
            let err = EnrichmentConfig::from_lookup(lookup(&[("ENRICH_CACHE_TTL_SECS", value)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "ENRICH_CACHE_TTL_SECS", .. }),
                "accepted ttl {}",
                value
            );
        }
    }

    #[test]
    fn test_invalid_value_names_key() {
        let err = EnrichmentConfig::from_lookup(lookup(&[("ENRICH_WORKERS", "eight")])).unwrap_err();
        match err {
            ConfigError::Invalid { key, value } => {
                assert_eq!(key, "ENRICH_WORKERS");
                assert_eq!(value, "eight");
            }
        }
    }
}
