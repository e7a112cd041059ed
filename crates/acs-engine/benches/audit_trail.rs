// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Criterion benchmark suite for the audit trail's hash-chain append.
//!
//! Run with: `cargo bench --bench audit_trail`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use acs_engine::AuditTrail;

/// Benchmark repeated `next_record` calls, measuring the cost of each
/// append (SHA-256 over the record's fields plus the running tip hash).
fn append_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("audit_trail");
    let trail = AuditTrail::resume(None);
    let details = serde_json::json!({"name": "bench-entity"});

    group.bench_function("append_entry", |bencher| {
        bencher.iter(|| {
            let record = trail.next_record(
                black_box("ENTITY:CREATE"),
                black_box("User"),
                black_box(Some(1)),
                black_box("bench-user"),
                details.clone(),
            );
            black_box(record);
        });
    });

    group.finish();
}

fn validate_integrity_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("audit_trail");
    let trail = AuditTrail::resume(None);
    let details = serde_json::json!({"name": "bench-entity"});
    let records: Vec<_> = (0..1_000)
        .map(|i| trail.next_record("ENTITY:CREATE", "User", Some(i), "bench-user", details.clone()))
        .collect();

    group.bench_function("validate_integrity_1000_records", |bencher| {
        bencher.iter(|| {
            let report = acs_engine::audit::validate_integrity(black_box(&records));
            black_box(report);
        });
    });

    group.finish();
}

criterion_group!(benches, append_benchmark, validate_integrity_benchmark);
criterion_main!(benches);
