//! # Title Aggregator
//!
//! Lists article titles from a news site for a range of years, combining the
//! site's feeds, its latest-listing pages, and sampled day archives.
//!
//! ## Usage
//!
//! ```sh
//! title_aggregator -s 2023 -e 2024 -p 2
//! ```
//!
//! ## Flow
//!
//! 1. **Config**: Load YAML overrides, apply CLI flags
//! 2. **Cache**: Reuse a fresh result for the same years unless `--refresh`
//! 3. **Scrape**: Feeds, listing pages, archive pages; dedup, filter, sort
//! 4. **Output**: Print one page of the list; optionally write it all as JSON

use chrono::{Datelike, Local};
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use title_aggregator::cli::Cli;
use title_aggregator::outputs::{cache::ResultCache, json, listing};
use title_aggregator::{DiagnosticSink, Scraper, ScraperConfig, SilentSink, TracingSink};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("title_aggregator starting up");

    // Parse CLI
    let args = Cli::parse();
    let span = args.year_span(Local::now().year());
    debug!(?args, %span, "Parsed CLI arguments");

    // ---- Load config ----
    let mut config = match &args.config {
        Some(path) => ScraperConfig::load(path)?,
        None => ScraperConfig::default(),
    };
    if args.insecure {
        config.accept_invalid_certs = true;
    }
    if args.deadline_secs.is_some() {
        config.deadline_secs = args.deadline_secs;
    }

    // ---- Cached result, or a fresh scrape ----
    let cache = ResultCache::new(&args.cache_dir, Duration::from_secs(args.cache_ttl_secs));
    let cached = if args.refresh {
        info!("Refresh requested; bypassing cache");
        None
    } else {
        cache.load_fresh(span).await
    };

    let from_cache = cached.is_some();
    let articles = match cached {
        Some(articles) => articles,
        None => {
            let sink: Arc<dyn DiagnosticSink> = if args.quiet {
                Arc::new(SilentSink)
            } else {
                Arc::new(TracingSink)
            };
            let scraper = Scraper::from_config(config)?.with_sink(sink);
            let articles = scraper.scrape_site(span.start, span.end).await;

            if articles.is_empty() {
                warn!(%span, "Scrape returned no articles; not caching");
            } else if let Err(e) = cache.store(span, &articles).await {
                error!(error = %e, "Failed to write cache entry");
            }
            articles
        }
    };

    // ---- Output ----
    let page = listing::paginate(&articles, args.page, args.per_page);
    print!("{}", listing::render(&page, span, from_cache));

    if let Some(path) = &args.json_output {
        if let Err(e) = json::write_articles(&articles, path).await {
            error!(path = %path, error = %e, "Failed to write JSON output");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        count = articles.len(),
        from_cache,
        "Execution complete"
    );

    Ok(())
}
