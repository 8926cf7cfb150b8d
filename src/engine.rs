//! The scrape pipeline.
//!
//! [`Scraper`] owns the fetcher, configuration, link pattern, and diagnostic
//! sink, and runs one scrape per [`Scraper::scrape_site`] call:
//!
//! 1. Harvest feeds, listing pages (recent ranges only), and archive pages
//!    concurrently.
//! 2. Concatenate in that stage order.
//! 3. Deduplicate by link, filter to the year span, sort newest first.
//!
//! No harvesting failure is fatal; the worst case is an empty list.

use crate::config::ScraperConfig;
use crate::diagnostics::{DiagnosticSink, Stage, StageReport, TracingSink};
use crate::error::ConfigError;
use crate::fetch::{HttpFetcher, PacedFetch, PageFetch};
use crate::models::Article;
use crate::pipeline::{self, YearSpan};
use crate::scrapers::pattern::{DatedPathPattern, LinkPattern};
use crate::scrapers::{Harvest, HarvestContext, archive, feeds, latest};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use url::Url;

/// Article-title aggregator for one site.
pub struct Scraper<F> {
    fetcher: F,
    config: ScraperConfig,
    base: Url,
    pattern: Box<dyn LinkPattern>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Scraper<PacedFetch<HttpFetcher>> {
    /// Build the production engine: a paced `reqwest` fetcher shared by all
    /// harvesters.
    pub fn from_config(config: ScraperConfig) -> Result<Self, ConfigError> {
        let http = HttpFetcher::new(&config)?;
        let fetcher = PacedFetch::from_config(http, &config);
        Self::new(fetcher, config)
    }
}

impl<F: PageFetch> Scraper<F> {
    /// Fails only when `config.base_url` is not a valid URL.
    pub fn new(fetcher: F, config: ScraperConfig) -> Result<Self, ConfigError> {
        let base = config.base()?;
        Ok(Self {
            fetcher,
            config,
            base,
            pattern: Box::new(DatedPathPattern),
            sink: Arc::new(TracingSink),
        })
    }

    /// Replace the dated-article link grammar.
    pub fn with_pattern(mut self, pattern: impl LinkPattern + 'static) -> Self {
        self.pattern = Box::new(pattern);
        self
    }

    /// Replace where stage reports go.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Scrape articles published from `start_year` through `end_year`,
    /// relative to the local calendar date.
    ///
    /// Callers clamp the years beforehand. The result is deduplicated by link
    /// and sorted newest first.
    pub async fn scrape_site(&self, start_year: i32, end_year: i32) -> Vec<Article> {
        self.scrape_site_on(start_year, end_year, Local::now().date_naive())
            .await
    }

    /// [`Scraper::scrape_site`] evaluated as if the date were `today`.
    #[instrument(level = "info", skip(self))]
    pub async fn scrape_site_on(&self, start_year: i32, end_year: i32, today: NaiveDate) -> Vec<Article> {
        let started = Instant::now();
        let span = YearSpan::new(start_year, end_year);
        let ctx = HarvestContext {
            fetcher: &self.fetcher,
            config: &self.config,
            base: &self.base,
            pattern: self.pattern.as_ref(),
            today,
            deadline: self
                .config
                .deadline()
                .map(|limit| tokio::time::Instant::now() + limit),
        };

        let run_latest = span.touches_recent(today);
        let latest_pages = async {
            if run_latest {
                Some(latest::harvest(&ctx).await)
            } else {
                None
            }
        };
        let (from_feeds, from_latest, from_archive) = tokio::join!(
            feeds::harvest(&ctx),
            latest_pages,
            archive::harvest(&ctx, span)
        );

        self.report_harvest(Stage::Feeds, &from_feeds);
        match &from_latest {
            Some(harvest) => self.report_harvest(Stage::Latest, harvest),
            None => self.sink.report(&StageReport::skipped(Stage::Latest)),
        }
        self.report_harvest(Stage::Archive, &from_archive);

        let mut merged = from_feeds.articles;
        if let Some(harvest) = from_latest {
            merged.extend(harvest.articles);
        }
        merged.extend(from_archive.articles);

        let before = merged.len();
        let unique = pipeline::dedup(merged);
        self.sink.report(&StageReport::new(
            Stage::Dedup,
            unique.len(),
            before - unique.len(),
        ));

        let before = unique.len();
        let in_span = pipeline::filter_to_span(unique, span);
        self.sink.report(&StageReport::new(
            Stage::RangeFilter,
            in_span.len(),
            before - in_span.len(),
        ));

        let articles = pipeline::sort_newest_first(in_span);
        info!(
            %span,
            count = articles.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scrape complete"
        );
        articles
    }

    fn report_harvest(&self, stage: Stage, harvest: &Harvest) {
        self.sink.report(&StageReport {
            failed: harvest.pages_failed,
            truncated: harvest.truncated,
            ..StageReport::new(stage, harvest.articles.len(), harvest.discarded)
        });
    }
}
