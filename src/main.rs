//! Triage Threat-Intel CLI
//!
//! Checks a comma-separated list of hosts against the configured
//! threat-intelligence feeds and prints one block per host that was found.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use triage_agent_intel::{FeedSource, IntelConfig, IntelEngine};

/// Version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "triage-agent-intel")]
#[command(about = "Threat-intelligence lookup for suspicious hosts")]
struct Args {
    /// Comma-separated hosts to check (IPs, FQDNs or URLs)
    hosts: String,

    /// Plain (newline-delimited) feed URL; repeatable, replaces the defaults
    #[arg(long = "feed")]
    plain_feeds: Vec<String>,

    /// CSV feed URL; repeatable, replaces the defaults
    #[arg(long = "csv-feed")]
    csv_feeds: Vec<String>,

    /// Per-feed fetch timeout in seconds
    #[arg(long, default_value = "30", env = "INTEL_FETCH_TIMEOUT")]
    timeout_secs: u64,

    /// Maximum concurrent feed fetches
    #[arg(long, default_value = "4", env = "INTEL_CONCURRENCY")]
    concurrency: usize,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "INTEL_VERBOSE")]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> IntelConfig {
        let mut config = IntelConfig::default()
            .with_fetch_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_concurrent_fetches(self.concurrency);

        if !self.plain_feeds.is_empty() || !self.csv_feeds.is_empty() {
            let mut sources: Vec<FeedSource> = self
                .plain_feeds
                .iter()
                .map(|url| FeedSource::plain(url.clone(), url.clone()))
                .collect();
            sources.extend(
                self.csv_feeds
                    .iter()
                    .map(|url| FeedSource::csv(url.clone(), url.clone())),
            );
            config = config.with_sources(sources);
        }

        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("{}={}", env!("CARGO_CRATE_NAME"), log_level))
        .json()
        .init();

    info!(version = VERSION, "starting threat-intel lookup");

    let hosts: Vec<String> = args
        .hosts
        .split(',')
        .map(|host| host.trim().to_string())
        .filter(|host| !host.is_empty())
        .collect();
    if hosts.is_empty() {
        anyhow::bail!("no hosts given; pass a comma-separated list as the first argument");
    }

    let config = args.to_config();
    info!(
        sources = config.sources.len(),
        timeout_secs = args.timeout_secs,
        concurrency = config.max_concurrent_fetches,
        "configuration loaded"
    );

    let engine = IntelEngine::new(config)?;
    let results = engine.check_threats(&hosts).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No hosts were found in the configured feeds.");
    } else {
        for result in &results {
            println!("Host: {}", result.host);
            println!("Threat: {}", result.found);
            println!("Confidence: {}", result.confidence);
            println!("Feed: {}", result.feed_url);
            println!();
        }
    }

    if let Some(stats) = engine.last_run_stats() {
        info!(
            resolved = stats.resolved,
            candidates = stats.candidates,
            sources_failed = stats.sources_failed,
            "lookup complete"
        );
    }

    Ok(())
}
