//! Report Aggregation Benchmarks
//!
//! **Purpose:** Measure the cost of turning build outcomes into a report
//!
//! **Regression Threshold:** >20% slower than baseline
//!
//! **How to Run:**
//! ```bash
//! cargo bench --bench aggregation
//! ```
//!
//! **What's Being Measured:**
//! 1. `aggregate N outcomes` - partition, stable sort, totals
//! 2. `render table` - box table for a 500-row report
//! 3. `plan entries` - entry naming for 500 packages
//!
//! **Performance Notes:**
//! - Builds dominate real runs by orders of magnitude; this guards against
//!   accidental quadratic behavior in the report path

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::hint::black_box;

use bundle_sizer::infra::RealFileSystem;
use bundle_sizer::pipeline::{
    ArtifactSizes, BuildOutcome, EntryKind, EntryMaterializer, ReportRenderer, ResultAggregator,
    TotalsPolicy, AGGREGATE_NAME,
};

fn package_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("@scope/package-{i}")).collect()
}

fn outcomes(count: usize) -> Vec<BuildOutcome> {
    let materializer = EntryMaterializer::new("/bench/dist", "js", RealFileSystem);
    let mut all: Vec<BuildOutcome> = package_names(count)
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let i = i as u64;
            // Every tenth build fails
            let ok = i % 10 != 0;
            BuildOutcome {
                entry: materializer.describe(EntryKind::Single, name),
                exit_code: if ok { 0 } else { 1 },
                stdout: Vec::new(),
                stderr: if ok { Vec::new() } else { b"Could not resolve".to_vec() },
                sizes: ok.then(|| ArtifactSizes {
                    output_bytes: (i * 7919) % 100_000,
                    output_compressed_bytes: (i * 7919) % 30_000,
                }),
                failure: None,
            }
        })
        .collect();
    all.push(BuildOutcome {
        entry: materializer.describe(EntryKind::Aggregate, AGGREGATE_NAME),
        exit_code: 0,
        stdout: Vec::new(),
        stderr: Vec::new(),
        sizes: Some(ArtifactSizes {
            output_bytes: 5_000_000,
            output_compressed_bytes: 1_500_000,
        }),
        failure: None,
    });
    all
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    for count in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("outcomes", count), &count, |b, &count| {
            let aggregator = ResultAggregator::new(TotalsPolicy::IncludeAggregate);
            b.iter_batched(
                || outcomes(count),
                |outcomes| black_box(aggregator.aggregate(outcomes).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_render_table(c: &mut Criterion) {
    let report = ResultAggregator::new(TotalsPolicy::IncludeAggregate)
        .aggregate(outcomes(500))
        .unwrap();
    c.bench_function("render table", |b| {
        b.iter(|| black_box(ReportRenderer::render_table(black_box(&report))))
    });
}

fn bench_plan_entries(c: &mut Criterion) {
    let names = package_names(500);
    let materializer = EntryMaterializer::new("/bench/dist", "js", RealFileSystem);
    c.bench_function("plan entries", |b| {
        b.iter(|| {
            for name in &names {
                black_box(materializer.describe(EntryKind::Single, black_box(name)));
            }
        })
    });
}

criterion_group!(benches, bench_aggregate, bench_render_table, bench_plan_entries);
criterion_main!(benches);
