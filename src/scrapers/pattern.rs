//! Dated-article link recognition.
//!
//! Article URLs on the site carry their publish date in the path:
//! `/{year}/{month}/{day}/{slug}`. Listing and archive harvesters find
//! articles by running every anchor's `href` through a [`LinkPattern`]; the
//! trait keeps the grammar swappable without touching harvester control flow.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static DATED_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(\d{4})/(\d{1,2})/(\d{1,2})/([^/?#]+)").expect("dated path regex is valid")
});

static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// Date and slug read from an article href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedLink {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub slug: String,
}

impl DatedLink {
    /// The calendar date, if the path numbers form one.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

/// Recognizes article links.
pub trait LinkPattern: Send + Sync {
    fn match_href(&self, href: &str) -> Option<DatedLink>;
}

/// Default grammar: the first `/{4 digits}/{1-2 digits}/{1-2 digits}/{slug}`
/// run anywhere in the href.
#[derive(Debug, Default, Clone, Copy)]
pub struct DatedPathPattern;

impl LinkPattern for DatedPathPattern {
    fn match_href(&self, href: &str) -> Option<DatedLink> {
        let caps = DATED_PATH.captures(href)?;
        Some(DatedLink {
            year: caps[1].parse().ok()?,
            month: caps[2].parse().ok()?,
            day: caps[3].parse().ok()?,
            slug: caps[4].to_string(),
        })
    }
}

/// An anchor whose href matched the pattern.
#[derive(Debug, Clone)]
pub struct DatedAnchor {
    pub href: String,
    pub text: String,
    pub link: DatedLink,
}

/// Every `<a href>` in `html` that `pattern` recognizes, in document order.
pub fn dated_anchors(html: &str, pattern: &dyn LinkPattern) -> Vec<DatedAnchor> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHORS)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let link = pattern.match_href(href)?;
            Some(DatedAnchor {
                href: href.to_string(),
                text: element.text().collect::<String>(),
                link,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::html_page;

    #[test]
    fn test_matches_relative_and_absolute() {
        let p = DatedPathPattern;
        let rel = p.match_href("/2024/3/7/24093211/apple-vision-pro").unwrap();
        assert_eq!((rel.year, rel.month, rel.day), (2024, 3, 7));
        assert_eq!(rel.slug, "24093211");

        let abs = p
            .match_href("https://www.theverge.com/2023/12/25/holiday-gift-guide?ref=home")
            .unwrap();
        assert_eq!((abs.year, abs.month, abs.day), (2023, 12, 25));
        assert_eq!(abs.slug, "holiday-gift-guide");
    }

    #[test]
    fn test_rejects_undated_links() {
        let p = DatedPathPattern;
        assert!(p.match_href("/archives?page=2").is_none());
        assert!(p.match_href("/tech").is_none());
        assert!(p.match_href("/2024/3/7/").is_none());
        assert!(p.match_href("/archives/2024/3/7").is_none());
    }

    #[test]
    fn test_invalid_calendar_date() {
        let link = DatedPathPattern.match_href("/2023/2/30/not-a-day").unwrap();
        assert!(link.date().is_none());
        let link = DatedPathPattern.match_href("/2024/2/29/leap-day").unwrap();
        assert_eq!(link.date(), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_dated_anchors_in_document_order() {
        let html = html_page(&[
            ("/2024/1/2/first-story", "First story headline"),
            ("/about", "About us"),
            ("/2024/1/3/second-story", "  Second\n story  "),
        ]);
        let anchors = dated_anchors(&html, &DatedPathPattern);
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].href, "/2024/1/2/first-story");
        assert_eq!(anchors[0].text, "First story headline");
        assert_eq!(anchors[1].link.day, 3);
    }

    struct SlugOnly;

    impl LinkPattern for SlugOnly {
        fn match_href(&self, href: &str) -> Option<DatedLink> {
            href.strip_prefix("/story/").map(|slug| DatedLink {
                year: 2024,
                month: 1,
                day: 1,
                slug: slug.to_string(),
            })
        }
    }

    #[test]
    fn test_custom_pattern() {
        let html = html_page(&[("/story/abc", "A story with a slug"), ("/2024/1/2/x", "dated")]);
        let anchors = dated_anchors(&html, &SlugOnly);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].link.slug, "abc");
    }
}
