//! Engine configuration.
//!
//! Everything the engine keeps between calls lives here: the site origin, the
//! feed endpoint list, and the transport and pacing policy. Defaults target
//! The Verge; a YAML file passed with `--config` can override any subset of
//! fields.
//!
//! ```yaml
//! base_url: https://www.theverge.com
//! max_concurrency: 2
//! min_interval_ms: 500
//! archive:
//!   sample_earlier_months_of_current_year: true
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Browser user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Site feeds: the two global feeds, then topical sections, then companies
/// and categories.
pub const DEFAULT_FEED_PATHS: [&str; 15] = [
    "/rss/index.xml",
    "/rss/full.xml",
    "/tech/rss/index.xml",
    "/reviews/rss/index.xml",
    "/science/rss/index.xml",
    "/entertainment/rss/index.xml",
    "/policy/rss/index.xml",
    "/apple/rss/index.xml",
    "/google/rss/index.xml",
    "/microsoft/rss/index.xml",
    "/amazon/rss/index.xml",
    "/facebook/rss/index.xml",
    "/gaming/rss/index.xml",
    "/web/rss/index.xml",
    "/ai-artificial-intelligence/rss/index.xml",
];

/// Static configuration for a [`crate::engine::Scraper`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site origin every relative path and href is resolved against.
    pub base_url: String,
    /// Feed endpoints, relative to `base_url`.
    pub feed_paths: Vec<String>,
    /// General "latest" listing page, relative to `base_url`.
    pub listing_path: String,
    /// How many `?page=N` variants of the listing to walk.
    pub listing_pages: u32,
    /// Prefix of the per-day archive pages (`{archive_path}/{y}/{m}/{d}`).
    pub archive_path: String,
    pub archive: ArchiveSettings,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Skip TLS certificate and hostname verification. Off unless asked for.
    pub accept_invalid_certs: bool,
    /// Ceiling on in-flight requests across all harvesters.
    pub max_concurrency: usize,
    /// Minimum spacing between request starts.
    pub min_interval_ms: u64,
    /// Random extra spacing, uniformly drawn from `0..=jitter_ms`.
    pub jitter_ms: u64,
    /// Overall scrape deadline; on expiry the partial result is returned.
    pub deadline_secs: Option<u64>,
}

/// Archive sampling switches.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    /// Give the months of the current year that precede the current month the
    /// sparse day sample instead of skipping them.
    pub sample_earlier_months_of_current_year: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.theverge.com".to_string(),
            feed_paths: DEFAULT_FEED_PATHS.iter().map(|p| p.to_string()).collect(),
            listing_path: "/archives".to_string(),
            listing_pages: 10,
            archive_path: "/archives".to_string(),
            archive: ArchiveSettings::default(),
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
            max_concurrency: 4,
            min_interval_ms: 200,
            jitter_ms: 0,
            deadline_secs: None,
        }
    }
}

impl ScraperConfig {
    /// Load a YAML config file; missing fields keep their defaults.
    #[instrument(level = "info")]
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_yaml(&raw)?;
        info!(base_url = %config.base_url, feeds = config.feed_paths.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Parse [`ScraperConfig::base_url`].
    pub fn base(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// Concurrency ceiling, never below one.
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScraperConfig::default();
        assert_eq!(config.feed_paths.len(), 15);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.listing_pages, 10);
        assert!(!config.accept_invalid_certs);
        assert!(!config.archive.sample_earlier_months_of_current_year);
        assert_eq!(config.base().unwrap().as_str(), "https://www.theverge.com/");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ScraperConfig::from_yaml(
            "base_url: https://news.example.org\nmin_interval_ms: 500\narchive:\n  sample_earlier_months_of_current_year: true\n",
        )
        .unwrap();
        assert_eq!(config.base_url, "https://news.example.org");
        assert_eq!(config.min_interval(), Duration::from_millis(500));
        assert!(config.archive.sample_earlier_months_of_current_year);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.feed_paths.len(), 15);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            ScraperConfig::from_yaml("max_concurrency: lots"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ScraperConfig {
            base_url: "not a url".to_string(),
            ..ScraperConfig::default()
        };
        assert!(matches!(config.base(), Err(ConfigError::BaseUrl { .. })));
    }

    #[test]
    fn test_concurrency_floor() {
        let config = ScraperConfig {
            max_concurrency: 0,
            ..ScraperConfig::default()
        };
        assert_eq!(config.concurrency(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ScraperConfig::load("/definitely/not/here.yaml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
