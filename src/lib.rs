//! # Title Aggregator
//!
//! Collects article titles, links, and publish dates for a news site across a
//! range of calendar years. Three harvesters feed one pipeline:
//!
//! - **Feeds**: the site's RSS 2.0 / Atom endpoints
//! - **Latest**: the homepage and paginated listing (recent ranges only)
//! - **Archive**: per-day archive pages on a sampled day grid
//!
//! Results are merged in that order, deduplicated by link (first wins),
//! filtered to the requested years, and sorted newest first.
//!
//! ```no_run
//! use title_aggregator::{Scraper, ScraperConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let scraper = Scraper::from_config(ScraperConfig::default())?;
//! for article in scraper.scrape_site(2024, 2025).await {
//!     println!("{} {}", article.formatted_date(), article.title());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod pacing;
pub mod pipeline;
pub mod scrapers;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::ScraperConfig;
pub use diagnostics::{DiagnosticSink, SilentSink, Stage, StageReport, TracingSink};
pub use engine::Scraper;
pub use error::{ConfigError, FetchFailure, ParseFailure, ValidationFailure};
pub use fetch::{HttpFetcher, PacedFetch, PageFetch};
pub use models::{Article, Source};
pub use pipeline::YearSpan;
