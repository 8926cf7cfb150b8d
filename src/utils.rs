//! Utility functions for title cleanup, link resolution, and log formatting.
//!
//! This module provides helpers shared by the harvesters:
//! - Title normalization and the length / navigation-phrase checks
//! - Resolution of relative hrefs against the site origin
//! - String truncation for log previews

use crate::error::ValidationFailure;
use url::Url;

/// Minimum title length (in characters) for listing- and archive-derived
/// entries. Shorter anchors are almost always navigation links.
pub const MIN_TITLE_CHARS: usize = 10;

/// Anchor texts containing one of these (case-insensitively) are pagination
/// or navigation chrome, not headlines.
pub const NAVIGATION_PHRASES: [&str; 4] = ["next page", "previous", "load more", "view all"];

/// Collapse internal whitespace runs and trim the ends.
///
/// Anchor text pulled out of HTML usually carries layout newlines and
/// indentation; titles are stored on a single line.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_title("  Hello\n   world "), "Hello world");
/// ```
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize an anchor title and apply the page-derived title rules.
///
/// Every page-derived title must be at least [`MIN_TITLE_CHARS`] long. With
/// `reject_navigation` set, titles containing one of the
/// [`NAVIGATION_PHRASES`] are rejected as well.
pub fn validate_page_title(
    raw: &str,
    reject_navigation: bool,
) -> Result<String, ValidationFailure> {
    let title = normalize_title(raw);
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(ValidationFailure::ShortTitle {
            min: MIN_TITLE_CHARS,
        });
    }
    if reject_navigation && is_navigation_title(&title) {
        return Err(ValidationFailure::NavigationTitle(title));
    }
    Ok(title)
}

/// True when `title` contains one of the [`NAVIGATION_PHRASES`].
pub fn is_navigation_title(title: &str) -> bool {
    let lowered = title.to_lowercase();
    NAVIGATION_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Resolve `href` against `base`, producing an absolute URL string.
///
/// Absolute hrefs come back unchanged; relative and protocol-relative ones
/// pick up the base origin.
pub fn resolve_link(base: &Url, href: &str) -> Result<String, ValidationFailure> {
    let href = href.trim();
    if href.is_empty() {
        return Err(ValidationFailure::MissingField("link"));
    }
    base.join(href)
        .map(|url| url.to_string())
        .map_err(|_| ValidationFailure::UnresolvableLink(href.to_string()))
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
