//! Feed Fetching
//!
//! One HTTP GET per feed source with a bounded timeout. There are no retries
//! and no caching; a failed source is reported as a typed error and skipped
//! by the orchestrator, never escalated.

use std::time::Duration;

use tracing::debug;

/// Errors from fetching a single feed document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed returned HTTP {status}")]
    Status { status: reqwest::StatusCode },

    #[error("feed body is empty")]
    EmptyBody,
}

/// HTTP fetcher shared across feed sources.
#[derive(Clone)]
pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    /// Build a fetcher whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("triage-agent-intel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch one feed document and split it into raw lines.
    pub async fn fetch(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }

        debug!(url, bytes = body.len(), "fetched feed document");
        Ok(body.lines().map(str::to_owned).collect())
    }
}
