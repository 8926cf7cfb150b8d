//! Command-line interface definitions for Title Aggregator.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most arguments can also be provided via environment variables.

use crate::pipeline::YearSpan;
use clap::Parser;

/// Oldest year the aggregator will scrape.
pub const EARLIEST_YEAR: i32 = 2022;

/// Command-line arguments for the Title Aggregator application.
///
/// # Examples
///
/// ```sh
/// # Everything from 2022 through this year, first page of 50
/// title_aggregator
///
/// # A single past year, bypassing the cache, full list to JSON
/// title_aggregator -s 2023 -e 2023 --refresh -j ./articles.json
///
/// # Third page, quieter stage output, YAML overrides
/// title_aggregator -p 3 -q -c ./aggregator.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// First year to include
    #[arg(short, long, default_value_t = EARLIEST_YEAR)]
    pub start_year: i32,

    /// Last year to include (defaults to the current year)
    #[arg(short, long)]
    pub end_year: Option<i32>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "TITLE_AGGREGATOR_CONFIG")]
    pub config: Option<String>,

    /// Directory holding cached results
    #[arg(long, env = "TITLE_AGGREGATOR_CACHE_DIR", default_value = ".")]
    pub cache_dir: String,

    /// Seconds a cached result stays fresh
    #[arg(long, default_value_t = 1800)]
    pub cache_ttl_secs: u64,

    /// Ignore any cached result and scrape again
    #[arg(short, long)]
    pub refresh: bool,

    /// Page of results to print (1-based)
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Results per printed page
    #[arg(long, default_value_t = 50)]
    pub per_page: usize,

    /// Write the full result list to this JSON file
    #[arg(short, long)]
    pub json_output: Option<String>,

    /// Silence per-stage diagnostics
    #[arg(short, long)]
    pub quiet: bool,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Give up on outstanding fetches after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

impl Cli {
    /// Requested years, clamped to what can be scraped.
    ///
    /// The start is kept within `[EARLIEST_YEAR, current_year]`; the end
    /// within `[start, current_year]`.
    pub fn year_span(&self, current_year: i32) -> YearSpan {
        let start = self.start_year.clamp(EARLIEST_YEAR, current_year.max(EARLIEST_YEAR));
        let end = self.end_year.unwrap_or(current_year).min(current_year).max(start);
        YearSpan::new(start, end)
    }
}
