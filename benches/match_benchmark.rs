//! Matching Hot-Path Benchmarks
//!
//! Exercises feed parsing and the matching rule ladder against a synthetic
//! feed of realistic size.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use triage_agent_intel::config::FeedFormat;
use triage_agent_intel::{feed, matcher};

/// A plain feed with comments, hit counts and one URL-style entry.
fn synthetic_feed(entries: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(entries + 2);
    lines.push("# synthetic feed".to_string());
    for i in 0..entries {
        lines.push(format!("198.51.{}.{} {}", (i / 256) % 256, i % 256, i));
    }
    lines.push("evil.example.com/login".to_string());
    lines
}

fn bench_match(c: &mut Criterion) {
    let lines = synthetic_feed(10_000);
    let index = feed::parse(FeedFormat::Plain, &lines);

    let mut group = c.benchmark_group("match_candidate");
    group.throughput(Throughput::Elements(1));
    group.bench_function("ip_exact", |b| {
        b.iter(|| matcher::match_candidate(black_box("198.51.0.7"), &index))
    });
    group.bench_function("url_path_exact", |b| {
        b.iter(|| matcher::match_candidate(black_box("http://evil.example.com/login"), &index))
    });
    group.bench_function("miss_full_scan", |b| {
        b.iter(|| matcher::match_candidate(black_box("203.0.113.254"), &index))
    });
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let lines = synthetic_feed(10_000);
    c.bench_function("parse_plain_10k", |b| {
        b.iter(|| feed::parse(FeedFormat::Plain, black_box(&lines)))
    });
}

criterion_group!(benches, bench_match, bench_parse);
criterion_main!(benches);
