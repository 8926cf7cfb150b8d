//! Plain-text listing of a result page.

use crate::models::Article;
use crate::pipeline::YearSpan;
use std::fmt::Write;

/// Reasons printed when a scrape comes back empty.
const EMPTY_RESULT_REASONS: [&str; 4] = [
    "Network connectivity issues",
    "The site is temporarily unavailable",
    "Scraping is being blocked",
    "No articles published in the selected year range",
];

/// One page of a result list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    /// 1-based page number.
    pub number: usize,
    pub total_pages: usize,
    /// Index of the first item in the full list.
    pub offset: usize,
    /// Length of the full list.
    pub total: usize,
    pub items: &'a [Article],
}

impl Page<'_> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// Slice page `page` of `per_page` items out of `articles`. Page numbers below
/// 1 read as 1; pages past the end are empty.
pub fn paginate(articles: &[Article], page: usize, per_page: usize) -> Page<'_> {
    let per_page = per_page.max(1);
    let number = page.max(1);
    let offset = (number - 1).saturating_mul(per_page);
    let items = articles
        .get(offset..)
        .map(|rest| &rest[..rest.len().min(per_page)])
        .unwrap_or(&[]);

    Page {
        number,
        total_pages: articles.len().div_ceil(per_page),
        offset,
        total: articles.len(),
        items,
    }
}

/// Render `page` as numbered entries under a header naming the span, the
/// total count, and whether the list came from the cache.
pub fn render(page: &Page<'_>, span: YearSpan, from_cache: bool) -> String {
    let mut out = String::new();
    let origin = if from_cache {
        "cached, pass --refresh to re-scrape"
    } else {
        "fresh data loaded"
    };
    let _ = writeln!(out, "Articles ({span}) [{origin}]");
    let _ = write!(out, "Total articles: {}", page.total);
    if page.total_pages > 1 {
        let _ = write!(out, " | Page {} of {}", page.number, page.total_pages);
    }
    out.push_str("\n\n");

    if page.items.is_empty() {
        out.push_str("No articles found for the selected period.\n");
        out.push_str("This could be due to:\n");
        for reason in EMPTY_RESULT_REASONS {
            let _ = writeln!(out, "  - {reason}");
        }
        out.push_str("Try again with --refresh.\n");
        return out;
    }

    for (i, article) in page.items.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", page.offset + i + 1, article.title());
        let _ = writeln!(out, "   {} | {}", article.formatted_date(), article.link());
    }

    if page.has_previous() || page.has_next() {
        out.push('\n');
        if page.has_previous() {
            let _ = write!(out, "<< --page {}  ", page.number - 1);
        }
        let _ = write!(out, "PAGE {} OF {}", page.number, page.total_pages);
        if page.has_next() {
            let _ = write!(out, "  --page {} >>", page.number + 1);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use chrono::NaiveDate;

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| {
                Article::on_day(
                    format!("Headline number {i}"),
                    format!("https://www.theverge.com/2024/1/1/story-{i}"),
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    Source::Archive,
                )
            })
            .collect()
    }

    #[test]
    fn test_paginate_middle_page() {
        let list = articles(120);
        let page = paginate(&list, 2, 50);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.offset, 50);
        assert_eq!(page.items.len(), 50);
        assert_eq!(page.items[0].title(), "Headline number 50");
        assert!(page.has_previous());
        assert!(page.has_next());
    }

    #[test]
    fn test_paginate_last_and_past_end() {
        let list = articles(120);
        let last = paginate(&list, 3, 50);
        assert_eq!(last.items.len(), 20);
        assert!(!last.has_next());

        let past = paginate(&list, 9, 50);
        assert!(past.items.is_empty());
        assert!(!past.has_next());
    }

    #[test]
    fn test_paginate_clamps_page_zero() {
        let list = articles(3);
        let page = paginate(&list, 0, 50);
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_previous());
    }

    #[test]
    fn test_render_numbers_from_offset() {
        let list = articles(60);
        let text = render(&paginate(&list, 2, 50), YearSpan::new(2024, 2024), true);
        assert!(text.starts_with("Articles (2024) [cached"));
        assert!(text.contains("Total articles: 60 | Page 2 of 2"));
        assert!(text.contains("51. Headline number 50\n   January 01, 2024 | https://www.theverge.com/2024/1/1/story-50"));
        assert!(text.contains("<< --page 1"));
        assert!(!text.contains("--page 3"));
    }

    #[test]
    fn test_render_empty_result() {
        let text = render(&paginate(&[], 1, 50), YearSpan::new(2022, 2026), false);
        assert!(text.contains("(2022 - 2026) [fresh data loaded]"));
        assert!(text.contains("No articles found"));
        assert!(text.contains("Scraping is being blocked"));
    }
}
