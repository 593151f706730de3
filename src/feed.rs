//! Feed Parsing & Normalization
//!
//! Converts a fetched feed document into a flat list of indicator entries.
//! Plain feeds are normalized line by line; CSV feeds are reduced to their
//! indicator column and filtered through the indicator validators.

use rustc_hash::FxHashSet;
use tracing::error;

use crate::config::FeedFormat;
use crate::indicator;

/// A parsed, normalized feed ready for matching.
///
/// Entries are kept in source order for substring scans, alongside a hash
/// set over the same entries for exact lookups. Duplicates are retained in
/// the ordered list. Entries are never empty and never start with `#`.
#[derive(Debug, Default)]
pub struct FeedIndex {
    entries: Vec<String>,
    exact: FxHashSet<String>,
}

impl FeedIndex {
    fn from_entries(entries: Vec<String>) -> Self {
        let exact = entries.iter().cloned().collect();
        Self { entries, exact }
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the feed parsed down to nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact entry lookup.
    pub fn contains(&self, value: &str) -> bool {
        self.exact.contains(value)
    }

    /// True when any entry contains `needle` as a substring.
    pub fn contains_substring(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.contains(needle))
    }

    /// Entries in source order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Parse a fetched document into a [`FeedIndex`] according to its format.
pub fn parse(format: FeedFormat, lines: &[String]) -> FeedIndex {
    match format {
        FeedFormat::Plain => FeedIndex::from_entries(normalize_plain(lines)),
        FeedFormat::Csv => FeedIndex::from_entries(extract_csv(lines)),
    }
}

/// Strip comments, blank lines and trailing annotations from a plain feed,
/// splitting dashed IPv4 ranges into their two endpoint entries.
///
/// Only the endpoints of a range are kept; the range is not enumerated.
fn normalize_plain(lines: &[String]) -> Vec<String> {
    let mut entries = Vec::with_capacity(lines.len());
    for line in lines {
        // First token only; the rest is usually a hit count or annotation.
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        if token.starts_with('#') {
            continue;
        }
        if indicator::is_ip_range(token) {
            entries.extend(token.split('-').map(str::to_owned));
        } else {
            entries.push(token.to_owned());
        }
    }
    entries
}

/// Extract the indicator column from a CSV document.
///
/// The first line is the header; a `url` column is preferred, `ip` is the
/// fallback. With neither present the whole feed is discarded. Rows shorter
/// than the indicator column are skipped, and extracted values are kept only
/// when they validate as an IP or URL.
fn extract_csv(lines: &[String]) -> Vec<String> {
    let Some((header, rows)) = lines.split_first() else {
        error!("CSV document has no header row, discarding feed");
        return Vec::new();
    };

    let columns: Vec<&str> = header.split(',').collect();
    let Some(index) = columns
        .iter()
        .position(|column| *column == "url")
        .or_else(|| columns.iter().position(|column| *column == "ip"))
    else {
        error!(header = %header, "no url or ip column in CSV header, discarding feed");
        return Vec::new();
    };

    let mut entries = Vec::new();
    for row in rows {
        let Some(value) = row.split(',').nth(index) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if indicator::is_ip(value) || indicator::is_url(value) {
            entries.push(value.to_owned());
        }
    }
    entries
}
