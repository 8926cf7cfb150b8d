use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use title_aggregator::{
    DiagnosticSink, PacedFetch, HttpFetcher, Scraper, ScraperConfig, Source, Stage, StageReport,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Site</title>
    <item>
      <title>Tiny</title>
      <link>/2023/5/4/shared-story</link>
      <pubDate>Thu, 04 May 2023 09:15:00 +0000</pubDate>
    </item>
    <item>
      <title>A story from another year</title>
      <link>/2021/3/3/older</link>
      <pubDate>Wed, 03 Mar 2021 10:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#;

const DAY_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <a href="/2023/5/4/shared-story"><img src="thumb.jpg"></a>
  <a href="/2023/5/4/shared-story">The archive's longer title for the shared story</a>
  <a href="/2023/5/4/archive-only">A story only the day archive lists</a>
  <a href="/2023/5/4/six">Six!!!</a>
  <a href="/archives/2023/5/5">Next page</a>
</body></html>"#;

#[derive(Default)]
struct TestSink {
    reports: Arc<Mutex<Vec<StageReport>>>,
}

impl TestSink {
    fn take(&self) -> Vec<StageReport> {
        self.reports.lock().unwrap().drain(..).collect()
    }
}

impl DiagnosticSink for TestSink {
    fn report(&self, report: &StageReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn config_for(server: &MockServer) -> ScraperConfig {
    ScraperConfig {
        base_url: server.uri(),
        max_concurrency: 8,
        min_interval_ms: 0,
        ..ScraperConfig::default()
    }
}

#[tokio::test]
async fn scrape_merges_feed_and_archive_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss/index.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FEED, "application/rss+xml"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/archives/2023/5/4"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(DAY_PAGE, "text/html"))
        .mount(&server)
        .await;

    let sink = Arc::new(TestSink::default());
    let scraper = Scraper::from_config(config_for(&server))
        .expect("engine builds")
        .with_sink(sink.clone());

    let articles = scraper.scrape_site_on(2023, 2023, today()).await;

    let titles: Vec<_> = articles.iter().map(|a| a.title()).collect();
    assert_eq!(titles, vec!["Tiny", "A story only the day archive lists"]);
    assert_eq!(articles[0].source(), Source::Feed);
    assert_eq!(articles[0].link(), format!("{}/2023/5/4/shared-story", server.uri()));
    assert_eq!(articles[1].source(), Source::Archive);
    assert_eq!(articles[1].formatted_date(), "May 04, 2023");

    // 15 feed endpoints + 10 sampled days x 12 months, no listing pages
    let received = server.received_requests().await.expect("recording on");
    assert_eq!(received.len(), 15 + 120);
    assert!(!received.iter().any(|r| r.url.query().is_some()));

    let reports = sink.take();
    let latest = reports.iter().find(|r| r.stage == Stage::Latest).unwrap();
    assert!(latest.skipped);
    let archive = reports.iter().find(|r| r.stage == Stage::Archive).unwrap();
    // the image anchor claims the shared link, so only archive-only counts
    assert_eq!(archive.contributed, 1);
    assert_eq!(archive.failed, 119);
}

#[tokio::test]
async fn scrape_with_everything_failing_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let scraper = Scraper::from_config(config_for(&server)).expect("engine builds");
    let articles = scraper.scrape_site_on(2025, 2026, today()).await;
    assert!(articles.is_empty());

    let received = server.received_requests().await.expect("recording on");
    // feeds + every listing page + 2025 sample + October 2026 so far
    assert_eq!(received.len(), 15 + 12 + 120 + 16);
}

#[tokio::test]
async fn scrape_returns_partial_result_at_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = ScraperConfig {
        deadline_secs: Some(1),
        ..config_for(&server)
    };
    let http = HttpFetcher::new(&config).expect("client builds");
    let fetcher = PacedFetch::from_config(http, &config);
    let sink = Arc::new(TestSink::default());
    let scraper = Scraper::new(fetcher, config)
        .expect("engine builds")
        .with_sink(sink.clone());

    let started = Instant::now();
    let articles = scraper.scrape_site_on(2023, 2023, today()).await;
    assert!(articles.is_empty());
    assert!(started.elapsed() < Duration::from_secs(4));

    let reports = sink.take();
    let feeds = reports.iter().find(|r| r.stage == Stage::Feeds).unwrap();
    assert!(feeds.truncated);
    let archive = reports.iter().find(|r| r.stage == Stage::Archive).unwrap();
    assert!(archive.truncated);
}
