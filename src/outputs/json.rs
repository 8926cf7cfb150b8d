//! JSON output of the full result list.
//!
//! Each article is written as a flat record:
//!
//! ```json
//! [{"title": "...", "link": "https://...", "date": 1683158400,
//!   "date_formatted": "May 04, 2023", "source": "archive"}]
//! ```

use crate::models::Article;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `articles` to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn write_articles(
    articles: &[Article],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn Error>> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(articles)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(path = %path.display(), count = articles.len(), "Wrote JSON article list");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_write_articles_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("articles.json");
        let articles = vec![Article::on_day(
            "A story worth writing out",
            "https://www.theverge.com/2023/5/4/story",
            NaiveDate::from_ymd_opt(2023, 5, 4).unwrap(),
            Source::Archive,
        )];

        write_articles(&articles, &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["date_formatted"], "May 04, 2023");
        assert_eq!(value[0]["source"], "archive");
        assert_eq!(value[0]["date"], 1683158400);
    }
}
