//! In-memory fetcher for unit tests.

use crate::error::FetchFailure;
use crate::fetch::PageFetch;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned bodies by exact URL and answers 404 for everything else.
/// Every requested URL is recorded in order.
#[derive(Debug, Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl PageFetch for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchFailure::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Wrap anchors in a minimal HTML document.
pub fn html_page(anchors: &[(&str, &str)]) -> String {
    let links: String = anchors
        .iter()
        .map(|(href, text)| format!("<li><a href=\"{href}\">{text}</a></li>\n"))
        .collect();
    format!("<!DOCTYPE html><html><body><ul>\n{links}</ul></body></html>")
}
