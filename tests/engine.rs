//! End-to-end tests for the threat-intel engine.
//!
//! Each test serves fixture feed documents from a local TCP listener and
//! runs the full fetch, parse and match pipeline against it.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use triage_agent_intel::{FeedSource, IntelConfig, IntelEngine};

/// Serve the same HTTP response for every accepted connection and return the
/// fixture URL.
async fn serve_fixture(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let addr = listener.local_addr().expect("fixture addr");

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = stream.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{addr}/feed")
}

fn test_config(sources: Vec<FeedSource>) -> IntelConfig {
    IntelConfig::default()
        .with_sources(sources)
        .with_fetch_timeout(Duration::from_secs(5))
}

fn test_engine(sources: Vec<FeedSource>) -> IntelEngine {
    IntelEngine::new(test_config(sources)).expect("create engine")
}

fn hosts(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|host| host.to_string()).collect()
}

#[tokio::test]
async fn ip_exact_match_in_plain_feed() {
    let url = serve_fixture("200 OK", "# bad hosts\n10.0.0.1 42\nfoo.example\n").await;
    let engine = test_engine(vec![FeedSource::plain("fixture", url.clone())]);

    let results = engine.check_threats(&hosts(&["10.0.0.1"])).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].host, "10.0.0.1");
    assert!(results[0].found);
    assert_eq!(results[0].confidence, 1.0);
    assert_eq!(results[0].feed_url, url);
}

#[tokio::test]
async fn url_candidate_matches_host_entry() {
    let url = serve_fixture("200 OK", "evil.example.com\n").await;
    let engine = test_engine(vec![FeedSource::plain("fixture", url)]);

    let results = engine
        .check_threats(&hosts(&["http://evil.example.com/login"]))
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].confidence, 1.0);
}

#[tokio::test]
async fn superstring_entry_downgrades_confidence() {
    let url = serve_fixture("200 OK", "something-evil.example.com/login-page\n").await;
    let engine = test_engine(vec![FeedSource::plain("fixture", url)]);

    let results = engine
        .check_threats(&hosts(&["http://evil.example.com/login?x=1"]))
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].confidence, 0.9);
}

#[tokio::test]
async fn failed_feed_does_not_block_later_sources() {
    // Nothing listens on the first source; the run must still resolve the
    // candidate against the second one.
    let dead = "http://127.0.0.1:9/feed".to_string();
    let live = serve_fixture("200 OK", "10.0.0.1\n").await;
    let engine = test_engine(vec![
        FeedSource::plain("dead", dead),
        FeedSource::plain("live", live.clone()),
    ]);

    let results = engine.check_threats(&hosts(&["10.0.0.1"])).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].feed_url, live);

    let stats = engine.last_run_stats().expect("run stats");
    assert_eq!(stats.sources_attempted, 2);
    assert_eq!(stats.sources_failed, 1);
    assert_eq!(stats.resolved, 1);
}

#[tokio::test]
async fn non_success_status_is_skipped() {
    let broken = serve_fixture("404 Not Found", "gone\n").await;
    let live = serve_fixture("200 OK", "10.0.0.1\n").await;
    let engine = test_engine(vec![
        FeedSource::plain("broken", broken),
        FeedSource::plain("live", live.clone()),
    ]);

    let results = engine.check_threats(&hosts(&["10.0.0.1"])).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].feed_url, live);
}

#[tokio::test]
async fn csv_feed_matches_extracted_url() {
    let url = serve_fixture(
        "200 OK",
        "name,url,date\nphish1,http://bad.test/login,2024-01-01\nshort-row\n",
    )
    .await;
    let engine = test_engine(vec![FeedSource::csv("fixture", url)]);

    let results = engine.check_threats(&hosts(&["http://bad.test/login"])).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].confidence, 1.0);
}

#[tokio::test]
async fn csv_without_indicator_column_is_discarded() {
    let url = serve_fixture("200 OK", "name,date\nphish1,2024-01-01\n").await;
    let engine = test_engine(vec![FeedSource::csv("fixture", url)]);

    let results = engine.check_threats(&hosts(&["phish1"])).await;

    assert!(results.is_empty());
    let stats = engine.last_run_stats().expect("run stats");
    assert_eq!(stats.sources_empty, 1);
}

#[tokio::test]
async fn first_configured_source_wins() {
    let first = serve_fixture("200 OK", "1.2.3.4\n").await;
    let second = serve_fixture("200 OK", "1.2.3.4\n").await;
    let engine = test_engine(vec![
        FeedSource::plain("first", first.clone()),
        FeedSource::plain("second", second),
    ]);

    let results = engine.check_threats(&hosts(&["1.2.3.4"])).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].feed_url, first);
}

#[tokio::test]
async fn plain_sources_are_checked_before_csv() {
    // The CSV source is configured first, but plain sources take priority.
    let csv = serve_fixture("200 OK", "url\nhttp://bad.test/x\n").await;
    let plain = serve_fixture("200 OK", "http://bad.test/x\n").await;
    let engine = test_engine(vec![
        FeedSource::csv("csv", csv),
        FeedSource::plain("plain", plain.clone()),
    ]);

    let results = engine.check_threats(&hosts(&["http://bad.test/x"])).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].feed_url, plain);
}

#[tokio::test]
async fn duplicate_candidates_resolve_once() {
    let url = serve_fixture("200 OK", "10.0.0.1\n").await;
    let engine = test_engine(vec![FeedSource::plain("fixture", url)]);

    let results = engine
        .check_threats(&hosts(&["10.0.0.1", " 10.0.0.1 ", "10.0.0.1"]))
        .await;

    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn unresolved_candidates_are_absent_from_results() {
    let url = serve_fixture("200 OK", "10.0.0.1\n").await;
    let engine = test_engine(vec![FeedSource::plain("fixture", url)]);

    let results = engine
        .check_threats(&hosts(&["10.0.0.1", "benign.example.org"]))
        .await;

    assert_eq!(results.len(), 1);
    assert!(results.iter().all(|result| result.host != "benign.example.org"));
}

#[tokio::test]
async fn dashed_range_endpoints_are_matchable() {
    let url = serve_fixture("200 OK", "1.2.3.4-1.2.3.9 # known bad range\n").await;
    let engine = test_engine(vec![FeedSource::plain("fixture", url)]);

    let results = engine
        .check_threats(&hosts(&["1.2.3.4", "1.2.3.9", "1.2.3.5"]))
        .await;

    // Both endpoints resolve exactly; addresses inside the range do not.
    let exact: Vec<&str> = results
        .iter()
        .filter(|result| result.confidence == 1.0)
        .map(|result| result.host.as_str())
        .collect();
    assert_eq!(exact, ["1.2.3.4", "1.2.3.9"]);
    assert!(!results.iter().any(|result| result.host == "1.2.3.5"));
}
