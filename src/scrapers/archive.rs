//! Per-day archive harvester.
//!
//! The site keeps one archive page per calendar day. Fetching all of them for
//! a multi-year range is too expensive, so past months are sampled on a fixed
//! day grid and only the current month is read in full.

use crate::error::ValidationFailure;
use crate::fetch::PageFetch;
use crate::models::{Article, Source};
use crate::pipeline::YearSpan;
use crate::scrapers::pattern::{DatedAnchor, LinkPattern, dated_anchors};
use crate::scrapers::{Harvest, HarvestContext};
use crate::utils::{resolve_link, validate_page_title};
use chrono::{Datelike, NaiveDate};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, instrument, trace, warn};
use url::Url;

/// Days read from each fully past month.
pub const SAMPLED_DAYS: [u32; 10] = [1, 4, 7, 10, 13, 16, 19, 22, 25, 28];

/// One archive page to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveDay {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl ArchiveDay {
    /// Site-relative path, without zero padding.
    pub fn path(&self, archive_path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            archive_path.trim_end_matches('/'),
            self.year,
            self.month,
            self.day
        )
    }
}

impl fmt::Display for ArchiveDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Day pages to fetch for `span`, newest year and month first.
///
/// The current month is read from day 1 through `today`. Other months of the
/// current year are skipped unless `sample_earlier_months` is set, in which
/// case the months before the current one get [`SAMPLED_DAYS`]. Future months
/// and years are never planned.
pub fn sampling_plan(span: YearSpan, today: NaiveDate, sample_earlier_months: bool) -> Vec<ArchiveDay> {
    let mut plan = Vec::new();
    for year in span.years_descending() {
        if year > today.year() {
            continue;
        }
        for month in (1..=12u32).rev() {
            let days: Vec<u32> = if year < today.year() {
                SAMPLED_DAYS.to_vec()
            } else if month == today.month() {
                (1..=today.day()).collect()
            } else if month < today.month() && sample_earlier_months {
                SAMPLED_DAYS.to_vec()
            } else {
                continue;
            };
            plan.extend(days.into_iter().map(|day| ArchiveDay { year, month, day }));
        }
    }
    plan
}

/// Vet one anchor. The first in-month anchor for a link claims it, so a later
/// anchor for the same link is a duplicate (`Ok(None)`) even when the first one
/// failed validation.
fn candidate(
    anchor: &DatedAnchor,
    target: ArchiveDay,
    base: &Url,
    seen: &mut HashSet<String>,
) -> Result<Option<Article>, ValidationFailure> {
    let link = &anchor.link;
    if link.year != target.year || link.month != target.month {
        return Err(ValidationFailure::MonthMismatch {
            year: link.year,
            month: link.month,
        });
    }
    let href = resolve_link(base, &anchor.href)?;
    if !seen.insert(href.clone()) {
        return Ok(None);
    }
    let title = validate_page_title(&anchor.text, true)?;
    let day = link.date().ok_or(ValidationFailure::InvalidDate {
        year: link.year,
        month: link.month,
        day: link.day,
    })?;
    Ok(Some(Article::on_day(title, href, day, Source::Archive)))
}

/// Accepted articles on one day page, each link at most once.
pub fn extract_day_page(
    html: &str,
    target: ArchiveDay,
    base: &Url,
    pattern: &dyn LinkPattern,
) -> Harvest {
    let mut harvest = Harvest {
        pages_fetched: 1,
        ..Harvest::default()
    };
    let mut seen = HashSet::new();

    for anchor in dated_anchors(html, pattern) {
        match candidate(&anchor, target, base, &mut seen) {
            Ok(Some(article)) => harvest.articles.push(article),
            Ok(None) => {
                trace!(href = %anchor.href, "Duplicate link on day page");
                harvest.discarded += 1;
            }
            Err(reason) => {
                trace!(href = %anchor.href, %reason, "Discarded archive anchor");
                harvest.discarded += 1;
            }
        }
    }
    harvest
}

/// Fetch the planned day pages concurrently and merge them in plan order.
#[instrument(level = "info", skip_all, fields(%span))]
pub async fn harvest<F: PageFetch>(ctx: &HarvestContext<'_, F>, span: YearSpan) -> Harvest {
    let plan = sampling_plan(
        span,
        ctx.today,
        ctx.config.archive.sample_earlier_months_of_current_year,
    );
    let planned = plan.len();
    debug!(pages = planned, "Planned archive pages");

    let per_day: Vec<Harvest> = stream::iter(plan)
        .map(|day| harvest_day(ctx, day))
        .buffered(ctx.config.concurrency())
        .take_until(ctx.deadline_reached())
        .collect()
        .await;

    let mut total = Harvest {
        truncated: per_day.len() < planned,
        ..Harvest::default()
    };
    for harvest in per_day {
        total.absorb(harvest);
    }

    info!(
        count = total.articles.len(),
        discarded = total.discarded,
        failed = total.pages_failed,
        "Harvested archive pages"
    );
    total
}

async fn harvest_day<F: PageFetch>(ctx: &HarvestContext<'_, F>, day: ArchiveDay) -> Harvest {
    let Some(url) = ctx.site_url(&day.path(&ctx.config.archive_path)) else {
        warn!(%day, "Archive path does not resolve against base URL");
        return Harvest::failed();
    };

    match ctx.fetcher.fetch(url.as_str()).await {
        Ok(body) => {
            let harvest = extract_day_page(&body, day, ctx.base, ctx.pattern);
            trace!(%url, count = harvest.articles.len(), "Parsed archive page");
            harvest
        }
        Err(e) => {
            warn!(error = %e, %url, "Archive fetch failed");
            Harvest::failed()
        }
    }
}
