//! Latest-listing harvester.
//!
//! Walks the homepage, the general listing page, and its `?page=N` variants in
//! order. Listing pages only surface fresh stories, so the engine runs this
//! harvester only for ranges that reach the current or previous year.

use crate::error::ValidationFailure;
use crate::fetch::PageFetch;
use crate::models::{Article, Source};
use crate::scrapers::pattern::{DatedAnchor, LinkPattern, dated_anchors};
use crate::scrapers::{Harvest, HarvestContext};
use crate::utils::{resolve_link, validate_page_title};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, instrument, trace, warn};
use url::Url;

/// One page of the listing walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub url: Url,
    /// A `?page=N` variant. Only these end the walk when empty.
    pub paginated: bool,
}

/// Pages to visit: site root, listing page, then `listing_pages` numbered
/// variants of the listing page.
pub fn listing_plan(base: &Url, listing_path: &str, listing_pages: u32) -> Vec<ListingPage> {
    let mut plan = Vec::new();
    if let Ok(root) = base.join("/") {
        plan.push(ListingPage {
            url: root,
            paginated: false,
        });
    }
    let Ok(listing) = base.join(listing_path) else {
        warn!(%listing_path, "Listing path does not resolve against base URL");
        return plan;
    };
    plan.push(ListingPage {
        url: listing.clone(),
        paginated: false,
    });
    for n in 1..=listing_pages {
        let mut url = listing.clone();
        url.query_pairs_mut().append_pair("page", &n.to_string());
        plan.push(ListingPage {
            url,
            paginated: true,
        });
    }
    plan
}

fn candidate(anchor: &DatedAnchor, base: &Url, today: NaiveDate) -> Result<Article, ValidationFailure> {
    let year = anchor.link.year;
    if (year - today.year()).abs() > 1 {
        return Err(ValidationFailure::OutsideWindow { year });
    }
    let title = validate_page_title(&anchor.text, false)?;
    let day = anchor.link.date().ok_or(ValidationFailure::InvalidDate {
        year,
        month: anchor.link.month,
        day: anchor.link.day,
    })?;
    let link = resolve_link(base, &anchor.href)?;
    Ok(Article::on_day(title, link, day, Source::Listing))
}

/// Accepted articles on one listing page.
pub fn extract_listing_page(
    html: &str,
    base: &Url,
    pattern: &dyn LinkPattern,
    today: NaiveDate,
) -> Harvest {
    let mut harvest = Harvest {
        pages_fetched: 1,
        ..Harvest::default()
    };
    for anchor in dated_anchors(html, pattern) {
        match candidate(&anchor, base, today) {
            Ok(article) => harvest.articles.push(article),
            Err(reason) => {
                trace!(href = %anchor.href, %reason, "Discarded listing anchor");
                harvest.discarded += 1;
            }
        }
    }
    harvest
}

/// Walk the listing pages sequentially.
///
/// A failed fetch skips that page. The first numbered page that yields no
/// accepted links ends the walk.
#[instrument(level = "info", skip_all)]
pub async fn harvest<F: PageFetch>(ctx: &HarvestContext<'_, F>) -> Harvest {
    let mut total = Harvest::default();

    for page in listing_plan(ctx.base, &ctx.config.listing_path, ctx.config.listing_pages) {
        if ctx.expired() {
            total.truncated = true;
            break;
        }
        let fetched = tokio::select! {
            result = ctx.fetcher.fetch(page.url.as_str()) => Some(result),
            _ = ctx.deadline_reached() => None,
        };
        let Some(result) = fetched else {
            total.truncated = true;
            break;
        };

        let body = match result {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, url = %page.url, "Listing fetch failed");
                total.pages_failed += 1;
                continue;
            }
        };

        let harvest = extract_listing_page(&body, ctx.base, ctx.pattern, ctx.today);
        let accepted = harvest.articles.len();
        debug!(url = %page.url, count = accepted, discarded = harvest.discarded, "Parsed listing page");
        total.absorb(harvest);

        if page.paginated && accepted == 0 {
            debug!(url = %page.url, "Listing exhausted");
            break;
        }
    }

    info!(
        count = total.articles.len(),
        discarded = total.discarded,
        failed = total.pages_failed,
        "Harvested listing pages"
    );
    total
}
