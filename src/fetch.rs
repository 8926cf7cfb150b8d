//! Page fetching with a fixed transport policy.
//!
//! This module is the engine's only contact with the network. It uses a
//! trait-based design so harvesters never see transport details:
//! - [`PageFetch`]: core trait, one GET returning a body or a [`FetchFailure`]
//! - [`HttpFetcher`]: `reqwest` implementation of the fixed policy
//! - [`PacedFetch`]: decorator adding a concurrency ceiling and a shared
//!   minimum-interval gate to any [`PageFetch`]
//!
//! # Transport Policy
//!
//! - 30 second timeout, redirects followed (up to 10)
//! - Browser user agent and fixed `Accept*` / `Connection` headers
//! - Anything but HTTP 200 is a failure
//! - No retries; every URL is attempted exactly once per scrape

use crate::config::ScraperConfig;
use crate::error::{ConfigError, FetchFailure};
use crate::pacing::Pacer;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, HeaderMap, HeaderValue,
};
use reqwest::{Client, StatusCode, redirect};
use std::fmt;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

/// Trait for fetching a single page.
///
/// Implementors perform one GET per call and report every problem as a
/// [`FetchFailure`] value.
pub trait PageFetch {
    /// Fetch `url` and return its body.
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure>;
}

impl<T: PageFetch> PageFetch for &T {
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        (**self).fetch(url).await
    }
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build the HTTP client from the transport fields of `config`.
    ///
    /// Certificate verification stays on unless
    /// [`ScraperConfig::accept_invalid_certs`] is set.
    pub fn new(config: &ScraperConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .redirect(redirect::Policy::limited(10))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self { client })
    }
}

impl PageFetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::transport(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchFailure::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchFailure::transport(url, e))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Decorator that bounds and spaces the requests of any [`PageFetch`].
///
/// One `PacedFetch` is shared by all harvesters in a scrape, so the ceiling
/// and the interval apply to the target host as a whole.
pub struct PacedFetch<T> {
    inner: T,
    permits: Semaphore,
    pacer: Pacer,
}

impl<T: PageFetch> PacedFetch<T> {
    /// Wrap `inner` with at most `max_in_flight` concurrent requests, each
    /// started no sooner than `pacer` allows.
    pub fn new(inner: T, max_in_flight: usize, pacer: Pacer) -> Self {
        Self {
            inner,
            permits: Semaphore::new(max_in_flight.max(1)),
            pacer,
        }
    }

    pub fn from_config(inner: T, config: &ScraperConfig) -> Self {
        Self::new(
            inner,
            config.concurrency(),
            Pacer::new(config.min_interval(), config.jitter()),
        )
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for PacedFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacedFetch")
            .field("available_permits", &self.permits.available_permits())
            .field("pacer", &self.pacer)
            .finish()
    }
}

impl<T: PageFetch> PageFetch for PacedFetch<T> {
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        // The semaphore is never closed, so acquire only fails if it were.
        let _permit = self.permits.acquire().await.ok();
        self.pacer.wait().await;
        self.inner.fetch(url).await
    }
}
