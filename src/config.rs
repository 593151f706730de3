//! Engine Configuration
//!
//! Feed sources and fetch settings are explicit configuration handed to the
//! engine at construction; nothing is discovered at runtime and no process-
//! wide state is involved.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Wire format of a feed document, fixed at configuration time.
///
/// The format selects the parser; plain feeds go through the line
/// normalizer, CSV feeds through header-driven column extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFormat {
    /// Newline-delimited indicator list, `#` comments allowed.
    Plain,
    /// CSV document with a header row naming a `url` or `ip` column.
    Csv,
}

/// A single threat feed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    /// Human-readable name, used in logs.
    pub name: String,
    /// HTTP(S) endpoint serving the feed document.
    pub url: String,
    /// Document format.
    pub format: FeedFormat,
}

impl FeedSource {
    /// Create a new feed source.
    pub fn new(name: impl Into<String>, url: impl Into<String>, format: FeedFormat) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            format,
        }
    }

    /// Create a newline-delimited feed source.
    pub fn plain(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, url, FeedFormat::Plain)
    }

    /// Create a CSV feed source.
    pub fn csv(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, url, FeedFormat::Csv)
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct IntelConfig {
    /// Feed sources to check, in priority order within each format.
    pub sources: Vec<FeedSource>,
    /// Per-fetch timeout; a feed slower than this is skipped for the run.
    pub fetch_timeout: Duration,
    /// Maximum feed fetches in flight at once.
    pub max_concurrent_fetches: usize,
}

impl Default for IntelConfig {
    fn default() -> Self {
        Self {
            sources: sources::default_sources(),
            fetch_timeout: Duration::from_secs(30),
            max_concurrent_fetches: 4,
        }
    }
}

impl IntelConfig {
    /// Replace the feed sources.
    pub fn with_sources(mut self, sources: Vec<FeedSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Set the per-fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the fetch concurrency limit (minimum 1).
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }
}

/// Well-known public feed sources.
pub mod sources {
    use super::*;

    /// IPsum suspicious/malicious hosts.
    pub fn ipsum() -> FeedSource {
        FeedSource::plain(
            "IPsum",
            "https://raw.githubusercontent.com/stamparm/ipsum/master/ipsum.txt",
        )
    }

    /// Collective Intelligence Network Security bad-guys list.
    pub fn cins_army() -> FeedSource {
        FeedSource::plain("CINS Army", "https://cinsscore.com/list/ci-badguys.txt")
    }

    /// OpenPhish phishing URLs.
    pub fn openphish() -> FeedSource {
        FeedSource::plain("OpenPhish", "https://openphish.com/feed.txt")
    }

    /// Malware Domain List mirror.
    pub fn malware_domain_list() -> FeedSource {
        FeedSource::plain(
            "Malware Domain List",
            "https://panwdbl.appspot.com/lists/mdl.txt",
        )
    }

    /// Cybercrime Tracker known hosts.
    pub fn cybercrime_tracker() -> FeedSource {
        FeedSource::plain("Cybercrime Tracker", "https://cybercrime-tracker.net/all.php")
    }

    /// PhishTank verified-online dataset (CSV).
    pub fn phishtank() -> FeedSource {
        FeedSource::csv("PhishTank", "https://data.phishtank.com/data/online-valid.csv")
    }

    /// All default sources, plain feeds first.
    pub fn default_sources() -> Vec<FeedSource> {
        vec![
            ipsum(),
            cins_army(),
            openphish(),
            malware_domain_list(),
            cybercrime_tracker(),
            phishtank(),
        ]
    }
}
