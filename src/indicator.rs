//! Indicator Normalization
//!
//! Classifies candidate strings as IPv4 literals, URLs, or opaque text, and
//! derives host / host+path projections from URLs. All functions here are
//! total: malformed input falls back to the original string with a warning,
//! never an error to the caller.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::Url;

/// Anchored IPv4 literal, each octet 0-255. IPv6 is not supported.
static IP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])$",
    )
    .unwrap()
});

/// HTTP(S) URL: scheme and host required, path and query optional.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://[^\s/?#]+[^\s]*$").unwrap());

/// Dashed IPv4 range, e.g. `1.2.3.4-1.2.3.9`.
static IP_RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}-(?:[0-9]{1,3}\.){3}[0-9]{1,3}$").unwrap()
});

/// Returns true when the candidate is an IPv4 literal.
pub fn is_ip(candidate: &str) -> bool {
    IP_PATTERN.is_match(candidate)
}

/// Returns true when the candidate is an HTTP(S) URL.
pub fn is_url(candidate: &str) -> bool {
    URL_PATTERN.is_match(candidate)
}

/// Returns true for dashed IPv4 range tokens found in some plain feeds.
pub(crate) fn is_ip_range(token: &str) -> bool {
    IP_RANGE_PATTERN.is_match(token)
}

/// Network location of a URL candidate: host, plus `:port` when an explicit
/// non-default port is present.
///
/// Falls back to the candidate unchanged when no host can be parsed, so the
/// caller can still run whole-string matching on it.
pub fn host_of(candidate: &str) -> String {
    match Url::parse(candidate) {
        Ok(parsed) => match netloc_of(&parsed) {
            Some(netloc) => netloc,
            None => {
                warn!(candidate, "no network location in candidate");
                candidate.to_string()
            }
        },
        Err(error) => {
            warn!(candidate, error = %error, "candidate is not a parseable URL");
            candidate.to_string()
        }
    }
}

/// Network location concatenated with the URL path, query excluded.
///
/// A URL written without a path warns and yields the netloc alone. Parse
/// failures fall back to the candidate unchanged.
pub fn host_and_path_of(candidate: &str) -> String {
    match Url::parse(candidate) {
        Ok(parsed) => match netloc_of(&parsed) {
            Some(netloc) => {
                let path = parsed.path();
                if path.is_empty() || path == "/" {
                    warn!(candidate, "no path in candidate");
                    netloc
                } else {
                    format!("{netloc}{path}")
                }
            }
            None => {
                warn!(candidate, "no network location in candidate");
                candidate.to_string()
            }
        },
        Err(error) => {
            warn!(candidate, error = %error, "candidate is not a parseable URL");
            candidate.to_string()
        }
    }
}

fn netloc_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
