//! Harvesters that turn site pages into article candidates.
//!
//! Each harvester covers one category of source page and degrades to an empty
//! contribution rather than failing:
//!
//! | Harvester | Module | Pages | Notes |
//! |-----------|--------|-------|-------|
//! | Feeds | [`feeds`] | RSS 2.0 / Atom endpoints | Titles trusted as-is |
//! | Latest | [`latest`] | Homepage + paginated listing | Recent ranges only |
//! | Archive | [`archive`] | Per-day archive pages | Sampled day grid |
//!
//! # Common Patterns
//!
//! Each harvester module exports an async `harvest(...)` returning a
//! [`Harvest`]: the accepted articles plus counts of fetched, failed, and
//! discarded items for the stage report.
//!
//! Harvesters use:
//! - A shared [`PageFetch`] for every request (pacing lives there)
//! - [`pattern::LinkPattern`] to recognize dated article hrefs
//! - Graceful error handling (failed pages are logged and skipped)

pub mod archive;
pub mod feeds;
pub mod latest;
pub mod pattern;

use crate::config::ScraperConfig;
use crate::fetch::PageFetch;
use crate::models::Article;
use chrono::NaiveDate;
use futures::future::{self, Either};
use pattern::LinkPattern;
use std::future::Future;
use tokio::time::{Instant, sleep_until};
use url::Url;

/// What one harvester (or one page of it) produced.
#[derive(Debug, Default)]
pub struct Harvest {
    pub articles: Vec<Article>,
    /// Pages or endpoints fetched successfully.
    pub pages_fetched: usize,
    /// Pages or endpoints that failed to fetch or parse.
    pub pages_failed: usize,
    /// Candidates rejected by validation.
    pub discarded: usize,
    /// The deadline expired before every page was attempted.
    pub truncated: bool,
}

impl Harvest {
    pub fn failed() -> Self {
        Self {
            pages_failed: 1,
            ..Self::default()
        }
    }

    pub fn absorb(&mut self, other: Harvest) {
        self.articles.extend(other.articles);
        self.pages_fetched += other.pages_fetched;
        self.pages_failed += other.pages_failed;
        self.discarded += other.discarded;
        self.truncated |= other.truncated;
    }
}

/// Everything a harvester needs for one scrape.
pub struct HarvestContext<'a, F> {
    pub fetcher: &'a F,
    pub config: &'a ScraperConfig,
    pub base: &'a Url,
    pub pattern: &'a dyn LinkPattern,
    /// Calendar date the sampling and recency rules are evaluated against.
    pub today: NaiveDate,
    pub deadline: Option<Instant>,
}

impl<F: PageFetch> HarvestContext<'_, F> {
    /// Absolute URL for a site-relative `path`.
    pub fn site_url(&self, path: &str) -> Option<Url> {
        self.base.join(path).ok()
    }

    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves when the deadline passes; never resolves without one.
    pub fn deadline_reached(&self) -> impl Future<Output = ()> {
        match self.deadline {
            Some(deadline) => Either::Left(sleep_until(deadline)),
            None => Either::Right(future::pending()),
        }
    }
}
