//! Triage Threat-Intel Agent Library
//!
//! Matches candidate indicators (IP literals, FQDNs, full URLs) extracted
//! from suspicious email against public threat-intelligence feeds and
//! reports a graded confidence per hit.
//!
//! # Features
//!
//! - **Two feed formats**: newline-delimited host lists and CSV datasets
//! - **Layered matching**: structural exact matches outrank substring hits
//! - **Graded confidence**: fixed, reproducible scoring policy
//! - **Resilient fetching**: a dead feed is skipped, never fatal
//!
//! # Example
//!
//! ```ignore
//! use triage_agent_intel::{IntelConfig, IntelEngine};
//!
//! let engine = IntelEngine::new(IntelConfig::default())?;
//! let results = engine.check_threats(&candidates).await;
//! for result in &results {
//!     println!("{} found with confidence {}", result.host, result.confidence);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod feed;
pub mod fetch;
pub mod indicator;
pub mod matcher;

// Re-exports for convenience
pub use config::{FeedFormat, FeedSource, IntelConfig};
pub use engine::{IntelEngine, MatchResult, RunStats};
pub use fetch::FetchError;
pub use matcher::MatchKind;

use anyhow::Result;

/// Check candidates against the given feed sources with default settings.
///
/// Convenience wrapper for callers that do not hold a long-lived engine;
/// the email pipeline calls this once per message.
pub async fn check_threats(
    candidates: &[String],
    sources: Vec<FeedSource>,
) -> Result<Vec<MatchResult>> {
    let engine = IntelEngine::new(IntelConfig::default().with_sources(sources))?;
    Ok(engine.check_threats(candidates).await)
}
