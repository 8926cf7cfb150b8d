//! Syndication feed harvester.
//!
//! Walks the configured feed endpoints (global, topical, and company feeds),
//! lets `feed-rs` read each body as RSS 2.0 or Atom, and turns entries into
//! [`Article`]s. Feed titles are trusted, so the page-title length rule does
//! not apply here.
//!
//! # Field Mapping
//!
//! | Format | Title | Link | Date |
//! |--------|-------|------|------|
//! | RSS 2.0 | `title` | `link` | `pubDate`, else `dc:date` |
//! | Atom | `title` | `link@href`, else link text | `published`, else `updated` |
//!
//! A body that fails to parse, or is neither format, contributes nothing.

use crate::error::{ParseFailure, ValidationFailure};
use crate::fetch::PageFetch;
use crate::models::{Article, Source};
use crate::scrapers::{Harvest, HarvestContext};
use crate::utils::{normalize_title, resolve_link, truncate_for_log};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use feed_rs::model::{Entry, FeedType};
use feed_rs::parser;
use futures::stream::{self, StreamExt};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;
use tracing::{debug, info, instrument, trace, warn};
use url::Url;

/// Syndication format of a feed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Rss,
    Atom,
}

impl FeedFormat {
    fn from_feed_type(feed_type: &FeedType) -> Option<Self> {
        match feed_type {
            FeedType::RSS2 | FeedType::RSS0 => Some(FeedFormat::Rss),
            FeedType::Atom => Some(FeedFormat::Atom),
            _ => None,
        }
    }
}

/// Fields of one item or entry, before validation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Primary date, else the secondary one; `None` when neither parsed.
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedEntry {
    fn from_entry(entry: Entry, link_text: Option<String>) -> Self {
        FeedEntry {
            title: entry.title.map(|text| text.content),
            link: entry
                .links
                .into_iter()
                .next()
                .map(|link| link.href)
                .or(link_text),
            published_at: entry.published.or(entry.updated),
        }
    }
}

#[derive(Debug)]
pub struct FeedDocument {
    pub format: FeedFormat,
    pub entries: Vec<FeedEntry>,
}

/// Parse a feed body and collect its entries.
///
/// Dates go through [`parse_feed_date`], so a value it rejects counts as
/// absent and the secondary date is used instead.
pub fn parse_feed(xml: &str) -> Result<FeedDocument, ParseFailure> {
    let feed = parser::Builder::new()
        .timestamp_parser(parse_feed_date)
        .build()
        .parse(xml.as_bytes())?;
    let format =
        FeedFormat::from_feed_type(&feed.feed_type).ok_or(ParseFailure::UnrecognizedFormat)?;

    // feed-rs drops Atom links without an href
    let link_texts = match format {
        FeedFormat::Atom => atom_link_texts(xml),
        FeedFormat::Rss => Vec::new(),
    };
    let entries = feed
        .entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| FeedEntry::from_entry(entry, link_texts.get(i).cloned().flatten()))
        .collect();
    Ok(FeedDocument { format, entries })
}

/// Text of the first href-less `<link>` of each Atom entry, in entry order.
fn atom_link_texts(xml: &str) -> Vec<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut texts: Vec<Option<String>> = Vec::new();
    let mut depth = 0usize;
    let mut capturing = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = e.local_name();
                if depth == 2 && name.as_ref() == b"entry" {
                    texts.push(None);
                } else if depth == 3
                    && name.as_ref() == b"link"
                    && matches!(texts.last(), Some(None))
                    && !has_href(&e)
                {
                    capturing = true;
                    text.clear();
                }
            }
            Ok(Event::Text(t)) if capturing => {
                text.push_str(&unescape_lossy(&String::from_utf8_lossy(&t)));
            }
            Ok(Event::CData(c)) if capturing => {
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Ok(Event::GeneralRef(r)) if capturing => {
                let reference = format!("&{};", String::from_utf8_lossy(&r));
                text.push_str(&unescape_lossy(&reference));
            }
            Ok(Event::End(_)) => {
                if capturing && depth == 3 {
                    capturing = false;
                    let trimmed = text.trim();
                    if let (false, Some(slot)) = (trimmed.is_empty(), texts.last_mut()) {
                        *slot = Some(trimmed.to_string());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    texts
}

fn has_href(e: &BytesStart<'_>) -> bool {
    e.attributes()
        .flatten()
        .any(|attr| attr.key.local_name().as_ref() == b"href")
}

/// Resolve XML entities, keeping the raw text when one is unknown.
fn unescape_lossy(raw: &str) -> String {
    match unescape(raw) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => raw.to_string(),
    }
}

/// Parse the date formats feeds use in practice.
///
/// Tries RFC 2822 (RSS), RFC 3339 (Atom), then offset-less ISO forms read as
/// UTC, then a bare `YYYY-MM-DD`.
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Validate one entry and build its [`Article`].
pub fn entry_to_article(entry: FeedEntry, base: &Url) -> Result<Article, ValidationFailure> {
    let title = entry
        .title
        .as_deref()
        .map(normalize_title)
        .filter(|t| !t.is_empty())
        .ok_or(ValidationFailure::MissingField("title"))?;
    let link = entry
        .link
        .as_deref()
        .ok_or(ValidationFailure::MissingField("link"))
        .and_then(|href| resolve_link(base, href))?;
    let published_at = entry
        .published_at
        .ok_or(ValidationFailure::MissingField("date"))?;
    Ok(Article::new(title, link, published_at, Source::Feed))
}

/// Fetch and parse every configured feed endpoint.
///
/// Endpoints are fetched concurrently and merged in configuration order.
#[instrument(level = "info", skip_all, fields(endpoints = ctx.config.feed_paths.len()))]
pub async fn harvest<F: PageFetch>(ctx: &HarvestContext<'_, F>) -> Harvest {
    let endpoints: Vec<Url> = ctx
        .config
        .feed_paths
        .iter()
        .filter_map(|path| {
            let url = ctx.site_url(path);
            if url.is_none() {
                warn!(%path, "Skipping unresolvable feed path");
            }
            url
        })
        .collect();
    let planned = endpoints.len();

    let per_endpoint: Vec<Harvest> = stream::iter(endpoints)
        .map(|url| harvest_endpoint(ctx, url))
        .buffered(ctx.config.concurrency())
        .take_until(ctx.deadline_reached())
        .collect()
        .await;

    let mut total = Harvest {
        truncated: per_endpoint.len() < planned,
        ..Harvest::default()
    };
    for harvest in per_endpoint {
        total.absorb(harvest);
    }

    info!(
        count = total.articles.len(),
        discarded = total.discarded,
        failed = total.pages_failed,
        "Harvested feeds"
    );
    total
}

async fn harvest_endpoint<F: PageFetch>(ctx: &HarvestContext<'_, F>, url: Url) -> Harvest {
    let body = match ctx.fetcher.fetch(url.as_str()).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, %url, "Feed fetch failed");
            return Harvest::failed();
        }
    };

    let document = match parse_feed(&body) {
        Ok(document) => document,
        Err(e) => {
            warn!(
                error = %e,
                %url,
                preview = %truncate_for_log(&body, 200),
                "Feed parse failed"
            );
            return Harvest::failed();
        }
    };

    let format = document.format;
    let mut harvest = Harvest {
        pages_fetched: 1,
        ..Harvest::default()
    };
    for entry in document.entries {
        match entry_to_article(entry, ctx.base) {
            Ok(article) => harvest.articles.push(article),
            Err(reason) => {
                trace!(%url, %reason, "Discarded feed entry");
                harvest.discarded += 1;
            }
        }
    }

    debug!(
        %url,
        ?format,
        count = harvest.articles.len(),
        discarded = harvest.discarded,
        "Parsed feed"
    );
    harvest
}
