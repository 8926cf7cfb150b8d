//! Data models for harvested articles.
//!
//! This module defines the single entity the engine produces:
//! - [`Article`]: title, absolute link, and publish time of one story
//! - [`Source`]: which harvester first observed the article
//!
//! Articles serialize to a flat record (`title`, `link`, `date`,
//! `date_formatted`, `source`) where `date` is epoch seconds. The formatted
//! date is derived on the way out and re-derived on the way in.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable date rendering, e.g. "March 04, 2025".
pub const DATE_FORMAT: &str = "%B %d, %Y";

/// The harvester that produced an [`Article`].
///
/// Harvesters run in a fixed order (feeds, listing pages, archive pages), which
/// is also the precedence order when the same link shows up twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// RSS 2.0 or Atom syndication feed.
    Feed,
    /// Homepage or paginated "latest" listing.
    Listing,
    /// Per-day archive page.
    Archive,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Feed => "feed",
            Source::Listing => "listing",
            Source::Archive => "archive",
        };
        f.write_str(name)
    }
}

/// One harvested story.
///
/// Articles are immutable once built; harvesters validate titles and resolve
/// links before calling a constructor, so every instance already satisfies
/// "non-empty title, absolute link".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ArticleRecord", try_from = "ArticleRecord")]
pub struct Article {
    title: String,
    link: String,
    published_at: DateTime<Utc>,
    source: Source,
}

impl Article {
    /// Build an article with a full timestamp (feed entries).
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published_at: DateTime<Utc>,
        source: Source,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published_at,
            source,
        }
    }

    /// Build an article dated at midnight UTC of `day` (listing and archive
    /// entries, whose date comes from the URL path).
    pub fn on_day(
        title: impl Into<String>,
        link: impl Into<String>,
        day: NaiveDate,
        source: Source,
    ) -> Self {
        Self::new(title, link, day.and_time(chrono::NaiveTime::MIN).and_utc(), source)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Epoch seconds of [`Article::published_at`].
    pub fn timestamp(&self) -> i64 {
        self.published_at.timestamp()
    }

    /// Presentation form of the publish date, e.g. "March 04, 2025".
    pub fn formatted_date(&self) -> String {
        self.published_at.format(DATE_FORMAT).to_string()
    }
}

/// Serialized shape of an [`Article`].
#[derive(Debug, Serialize, Deserialize)]
struct ArticleRecord {
    title: String,
    link: String,
    date: i64,
    date_formatted: String,
    source: Source,
}

impl From<Article> for ArticleRecord {
    fn from(article: Article) -> Self {
        let date_formatted = article.formatted_date();
        Self {
            date: article.timestamp(),
            date_formatted,
            title: article.title,
            link: article.link,
            source: article.source,
        }
    }
}

impl TryFrom<ArticleRecord> for Article {
    type Error = String;

    fn try_from(record: ArticleRecord) -> Result<Self, Self::Error> {
        let published_at = DateTime::from_timestamp(record.date, 0)
            .ok_or_else(|| format!("timestamp {} is out of range", record.date))?;
        if record.title.trim().is_empty() {
            return Err("article title is empty".to_string());
        }
        Ok(Article::new(record.title, record.link, published_at, record.source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_formatted_date_pads_day() {
        let article = Article::on_day(
            "Apple announces something new",
            "https://example.com/2025/3/4/apple",
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            Source::Archive,
        );
        assert_eq!(article.formatted_date(), "March 04, 2025");
    }

    #[test]
    fn test_on_day_is_midnight_utc() {
        let article = Article::on_day(
            "A long enough headline",
            "https://example.com/a",
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            Source::Listing,
        );
        assert_eq!(
            article.published_at(),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_article_serialization() {
        let article = Article::new(
            "Feed title",
            "https://example.com/feed-item",
            Utc.with_ymd_and_hms(2025, 3, 4, 15, 30, 0).unwrap(),
            Source::Feed,
        );

        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["title"], "Feed title");
        assert_eq!(json["link"], "https://example.com/feed-item");
        assert_eq!(json["date"], article.timestamp());
        assert_eq!(json["date_formatted"], "March 04, 2025");
        assert_eq!(json["source"], "feed");
    }

    #[test]
    fn test_article_deserialization_ignores_stored_formatting() {
        let json = r#"{
            "title": "Cached headline here",
            "link": "https://example.com/2023/1/1/cached",
            "date": 1672531200,
            "date_formatted": "whatever was written",
            "source": "archive"
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.source(), Source::Archive);
        assert_eq!(article.formatted_date(), "January 01, 2023");
    }

    #[test]
    fn test_article_deserialization_rejects_empty_title() {
        let json = r#"{"title": "  ", "link": "https://e.com/x", "date": 0,
                       "date_formatted": "", "source": "feed"}"#;
        assert!(serde_json::from_str::<Article>(json).is_err());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(Source::Feed.to_string(), "feed");
        assert_eq!(Source::Listing.to_string(), "listing");
        assert_eq!(Source::Archive.to_string(), "archive");
    }
}
