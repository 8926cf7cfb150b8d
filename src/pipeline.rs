//! Pure list transforms applied after harvesting.
//!
//! Harvester output is concatenated in stage order (feeds, listing pages,
//! archive pages) and then run through [`dedup`], [`filter_to_span`], and
//! [`sort_newest_first`]. Only dedup is order-sensitive: the first
//! occurrence of a link wins, so feed metadata beats archive metadata.

use crate::models::Article;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use itertools::Itertools;
use std::fmt;

/// Inclusive calendar-year range `[start-01-01 00:00:00, end-12-31 23:59:59]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearSpan {
    pub start: i32,
    pub end: i32,
}

impl YearSpan {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// First instant of the span.
    pub fn opens_at(&self) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(self.start, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// Last second of the span.
    pub fn closes_at(&self) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(self.end, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|dt| dt.and_utc())
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        match (self.opens_at(), self.closes_at()) {
            (Some(open), Some(close)) => open <= at && at <= close,
            _ => false,
        }
    }

    /// True when the span includes the year of `today` or the year before.
    /// Listing pages only surface fresh content, so older spans skip them.
    pub fn touches_recent(&self, today: NaiveDate) -> bool {
        let current = today.year();
        self.start <= current && self.end >= current - 1
    }

    /// Years covered, newest first.
    pub fn years_descending(&self) -> impl Iterator<Item = i32> {
        (self.start..=self.end).rev()
    }
}

impl fmt::Display for YearSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} - {}", self.start, self.end)
        }
    }
}

/// Keep the first article for each distinct link.
pub fn dedup(articles: Vec<Article>) -> Vec<Article> {
    articles
        .into_iter()
        .unique_by(|article| article.link().to_owned())
        .collect()
}

/// Keep articles published inside `span`, bounds included.
pub fn filter_to_span(articles: Vec<Article>, span: YearSpan) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|article| span.contains(article.published_at()))
        .collect()
}

/// Order by publish time, newest first. Ties keep their merged order.
pub fn sort_newest_first(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(|a, b| b.published_at().cmp(&a.published_at()));
    articles
}
