//! On-disk result cache keyed by year span.
//!
//! One JSON file per span, `cache_articles_{start}_{end}.json`, considered
//! fresh while its modification time is younger than the TTL.

use crate::models::Article;
use crate::pipeline::YearSpan;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn path_for(&self, span: YearSpan) -> PathBuf {
        self.dir
            .join(format!("cache_articles_{}_{}.json", span.start, span.end))
    }

    /// The cached list for `span`, if one exists and is younger than the TTL.
    /// Unreadable or corrupt entries count as misses.
    #[instrument(level = "debug", skip(self), fields(%span))]
    pub async fn load_fresh(&self, span: YearSpan) -> Option<Vec<Article>> {
        let path = self.path_for(span);
        let modified = fs::metadata(&path).await.ok()?.modified().ok()?;
        let age = modified.elapsed().unwrap_or_default();
        if age >= self.ttl {
            debug!(path = %path.display(), age_secs = age.as_secs(), "Cache entry is stale");
            return None;
        }

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cache entry");
                return None;
            }
        };
        match serde_json::from_str::<Vec<Article>>(&raw) {
            Ok(articles) => {
                info!(path = %path.display(), count = articles.len(), "Loaded cached articles");
                Some(articles)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt cache entry");
                None
            }
        }
    }

    /// Write `articles` as the entry for `span`.
    #[instrument(level = "debug", skip(self, articles), fields(%span, count = articles.len()))]
    pub async fn store(&self, span: YearSpan, articles: &[Article]) -> Result<PathBuf, Box<dyn Error>> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(span);
        let json = serde_json::to_string(articles)?;
        fs::write(&path, json).await?;
        debug!(path = %path.display(), "Stored cache entry");
        Ok(path)
    }
}
