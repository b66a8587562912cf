// ABOUTME: Criterion benchmarks for CGM graph decoding and severity bucket merge
// ABOUTME: Measures merge_cgm_series over one to seven days of 5-minute readings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the CGM merge.
//!
//! A full 48 hour lookback is 576 readings; the larger sizes cover accounts
//! with several sensors reporting into the same graph.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glooko_bridge::fetcher::merge::{merge_cgm_series, GraphResponse, GraphSeries};
use serde_json::{json, Value};

/// Graph payload with `count` readings spread over the three buckets
fn graph_payload(count: usize) -> Value {
    let start = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();
    let mut high = Vec::new();
    let mut normal = Vec::new();
    let mut low = Vec::new();

    for i in 0..count {
        let timestamp = (start + Duration::minutes(5 * i as i64))
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string();
        let y = 40 + (i * 37) % 300;
        let point = json!({ "timestamp": timestamp, "y": y });
        match y {
            0..=69 => low.push(point),
            70..=180 => normal.push(point),
            _ => high.push(point),
        }
    }

    json!({ "series": { "cgmHigh": high, "cgmNormal": normal, "cgmLow": low } })
}

fn series(count: usize) -> GraphSeries {
    let response: GraphResponse = serde_json::from_value(graph_payload(count)).unwrap();
    response.series.unwrap()
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_cgm_series");
    let correction = Duration::hours(3);

    for days in [1_usize, 2, 7] {
        let count = days * 288;
        let input = series(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{days}d")), &input, |b, s| {
            b.iter(|| merge_cgm_series(black_box(s), correction));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_graph");
    let body = serde_json::to_vec(&graph_payload(576)).unwrap();
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("48h", |b| {
        b.iter(|| {
            let response: GraphResponse = serde_json::from_slice(black_box(&body)).unwrap();
            black_box(response)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_merge, bench_decode);
criterion_main!(benches);
