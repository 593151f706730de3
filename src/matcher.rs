//! Layered Matching Policy
//!
//! Evaluates one candidate against one normalized feed with a fixed rule
//! ladder: structural exact matches first, then graded substring matches.
//! The ordering and the confidence attached to each rung are policy, not
//! runtime tunables; they must stay stable across releases.

use crate::feed::FeedIndex;
use crate::indicator::{host_and_path_of, host_of, is_ip, is_url};

/// How a candidate matched a feed entry, in strict priority order.
///
/// Exact structural matches are fully trusted. Substring matches are
/// downgraded since feed entries often embed the indicator inside noise
/// (schemes, query strings, adjacent tokens), and a shared path segment is
/// stronger evidence than a shared bare host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// IP candidate equal to a feed entry.
    IpExact,
    /// URL candidate whose host+path projection equals a feed entry.
    HostPathExact,
    /// URL candidate whose host projection equals a feed entry.
    HostExact,
    /// Raw candidate equal to a feed entry.
    FullExact,
    /// URL candidate whose host+path projection is contained in a feed entry.
    HostPathPartial,
    /// URL candidate whose host projection is contained in a feed entry.
    HostPartial,
    /// IP candidate contained in a feed entry.
    IpPartial,
    /// Raw candidate contained in a feed entry.
    FullPartial,
}

impl MatchKind {
    /// Confidence assigned by the policy.
    pub fn confidence(self) -> f64 {
        match self {
            MatchKind::IpExact
            | MatchKind::HostPathExact
            | MatchKind::HostExact
            | MatchKind::FullExact => 1.0,
            MatchKind::HostPathPartial => 0.9,
            MatchKind::FullPartial => 0.7,
            MatchKind::HostPartial | MatchKind::IpPartial => 0.6,
        }
    }

    /// Stable label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::IpExact => "ip-exact",
            MatchKind::HostPathExact => "fqdn-path-exact",
            MatchKind::HostExact => "fqdn-exact",
            MatchKind::FullExact => "full-exact",
            MatchKind::HostPathPartial => "fqdn-path-partial",
            MatchKind::HostPartial => "fqdn-partial",
            MatchKind::IpPartial => "ip-partial",
            MatchKind::FullPartial => "full-partial",
        }
    }
}

/// Run the rule ladder for one candidate against one feed.
///
/// Returns the first rule that hits, or `None` when the candidate is absent
/// from the feed. Candidates that are neither IPs nor URLs can only hit the
/// whole-string rules.
pub fn match_candidate(candidate: &str, feed: &FeedIndex) -> Option<MatchKind> {
    let candidate_is_ip = is_ip(candidate);
    let candidate_is_url = is_url(candidate);

    // URL projections, computed once for both the exact and partial phases.
    let host_path = candidate_is_url.then(|| host_and_path_of(candidate));
    let host = candidate_is_url.then(|| host_of(candidate));

    if candidate_is_ip && feed.contains(candidate) {
        return Some(MatchKind::IpExact);
    }
    if let Some(host_path) = &host_path {
        if feed.contains(host_path) {
            return Some(MatchKind::HostPathExact);
        }
    }
    if let Some(host) = &host {
        if feed.contains(host) {
            return Some(MatchKind::HostExact);
        }
    }
    if feed.contains(candidate) {
        return Some(MatchKind::FullExact);
    }

    if let Some(host_path) = &host_path {
        if feed.contains_substring(host_path) {
            return Some(MatchKind::HostPathPartial);
        }
    }
    if let Some(host) = &host {
        if feed.contains_substring(host) {
            return Some(MatchKind::HostPartial);
        }
    }
    if candidate_is_ip && feed.contains_substring(candidate) {
        return Some(MatchKind::IpPartial);
    }
    if feed.contains_substring(candidate) {
        return Some(MatchKind::FullPartial);
    }

    None
}
