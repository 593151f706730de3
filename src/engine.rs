//! Threat Intel Orchestrator
//!
//! Fans feed fetches out under a bounded concurrency limit, joins them, and
//! then matches every still-pending candidate against each feed strictly in
//! configured order (plain sources before CSV sources). The first source to
//! match a candidate wins; later sources never re-evaluate it, even if they
//! would score higher.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::{FeedFormat, FeedSource, IntelConfig};
use crate::feed::{self, FeedIndex};
use crate::fetch::FeedFetcher;
use crate::matcher;

/// Outcome for one resolved candidate.
///
/// Candidates absent from every feed produce no result at all; absence means
/// "unknown", not "benign".
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    /// The candidate as submitted, trimmed.
    pub host: String,
    /// Whether the candidate was found in a feed.
    pub found: bool,
    /// Confidence in [0, 1] per the fixed matching policy.
    pub confidence: f64,
    /// URL of the feed that produced the match.
    pub feed_url: String,
}

/// Summary of one `check_threats` run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Sources the run attempted to fetch.
    pub sources_attempted: usize,
    /// Sources that failed to fetch.
    pub sources_failed: usize,
    /// Sources that fetched but parsed down to nothing.
    pub sources_empty: usize,
    /// Total feed entries matched against.
    pub entries_scanned: usize,
    /// Distinct candidates submitted.
    pub candidates: usize,
    /// Candidates resolved against some feed.
    pub resolved: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Threat-intelligence matching engine.
pub struct IntelEngine {
    config: IntelConfig,
    fetcher: FeedFetcher,
    last_run: RwLock<Option<RunStats>>,
}

impl IntelEngine {
    /// Create an engine over an explicit feed configuration.
    pub fn new(config: IntelConfig) -> Result<Self> {
        let fetcher = FeedFetcher::new(config.fetch_timeout)?;
        Ok(Self {
            config,
            fetcher,
            last_run: RwLock::new(None),
        })
    }

    /// Stats from the most recent run, if any.
    pub fn last_run_stats(&self) -> Option<RunStats> {
        self.last_run.read().clone()
    }

    /// Check candidates against every configured feed source.
    ///
    /// Returns at most one result per distinct candidate. A candidate
    /// resolved by an earlier-configured source is never re-evaluated
    /// against later ones.
    pub async fn check_threats(&self, candidates: &[String]) -> Vec<MatchResult> {
        let started = Instant::now();
        let mut stats = RunStats::default();

        let mut pending = dedupe_candidates(candidates);
        stats.candidates = pending.len();

        if pending.is_empty() {
            stats.elapsed = started.elapsed();
            *self.last_run.write() = Some(stats);
            return Vec::new();
        }

        let ordered = order_sources(&self.config.sources);
        stats.sources_attempted = ordered.len();

        info!(
            candidates = pending.len(),
            sources = ordered.len(),
            "checking candidates against threat feeds"
        );

        let feeds = self.fetch_all(&ordered).await;

        let mut results = Vec::new();
        for (source, outcome) in ordered.iter().zip(feeds) {
            if pending.is_empty() {
                break;
            }
            let Some(feed) = outcome else {
                stats.sources_failed += 1;
                continue;
            };
            if feed.is_empty() {
                stats.sources_empty += 1;
                error!(source = %source.name, url = %source.url, "feed parsed down to nothing, skipping");
                continue;
            }
            stats.entries_scanned += feed.len();

            pending.retain(|candidate| match matcher::match_candidate(candidate, &feed) {
                Some(kind) => {
                    debug!(
                        host = %candidate,
                        kind = kind.as_str(),
                        confidence = kind.confidence(),
                        feed = %source.url,
                        "candidate found in feed"
                    );
                    results.push(MatchResult {
                        host: candidate.clone(),
                        found: true,
                        confidence: kind.confidence(),
                        feed_url: source.url.clone(),
                    });
                    false
                }
                None => true,
            });
        }

        stats.resolved = results.len();
        stats.elapsed = started.elapsed();
        info!(
            resolved = stats.resolved,
            candidates = stats.candidates,
            sources_failed = stats.sources_failed,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "threat feed check complete"
        );
        *self.last_run.write() = Some(stats);

        results
    }

    /// Fetch and parse every source concurrently, preserving source order in
    /// the returned vector. `None` marks a source that failed to fetch.
    async fn fetch_all(&self, sources: &[FeedSource]) -> Vec<Option<FeedIndex>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1)));
        let mut tasks = JoinSet::new();

        for (index, source) in sources.iter().enumerate() {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            let name = source.name.clone();
            let url = source.url.clone();
            let format = source.format;
            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition cannot fail.
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = fetcher
                    .fetch(&url)
                    .await
                    .map(|lines| feed::parse(format, &lines));
                (index, name, url, outcome)
            });
        }

        let mut feeds: Vec<Option<FeedIndex>> = (0..sources.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, name, _url, Ok(feed))) => {
                    debug!(source = %name, entries = feed.len(), "feed ready");
                    feeds[index] = Some(feed);
                }
                Ok((_index, name, url, Err(error))) => {
                    error!(source = %name, url = %url, error = %error, "failed to fetch feed, skipping");
                }
                Err(error) => {
                    error!(error = %error, "feed fetch task failed");
                }
            }
        }
        feeds
    }
}

/// Trim candidates and collapse duplicates, preserving first-occurrence
/// order.
fn dedupe_candidates(candidates: &[String]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut pending = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let trimmed = candidate.trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_owned()) {
            continue;
        }
        pending.push(trimmed.to_owned());
    }
    pending
}

/// Stable-order sources for matching: all plain feeds first, then all CSV
/// feeds, configured order within each format.
fn order_sources(sources: &[FeedSource]) -> Vec<FeedSource> {
    let mut ordered = Vec::with_capacity(sources.len());
    ordered.extend(
        sources
            .iter()
            .filter(|source| source.format == FeedFormat::Plain)
            .cloned(),
    );
    ordered.extend(
        sources
            .iter()
            .filter(|source| source.format == FeedFormat::Csv)
            .cloned(),
    );
    ordered
}
