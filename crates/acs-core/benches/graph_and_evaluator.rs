// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Criterion benchmark suite for the entity graph and permission evaluator.
//!
//! Run with: `cargo bench --bench graph_and_evaluator`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use acs_core::cache::PermissionCache;
use acs_core::evaluator::PermissionEvaluator;
use acs_core::graph::EntityGraph;
use acs_core::types::{CacheKey, EntityKind, Permission, Verb};

/// Build a graph with `group_depth` nested groups and one user at the
/// bottom, plus `resource_count` resources with a grant on the top-level
/// group.
fn build_graph(group_depth: usize, resource_count: usize) -> (EntityGraph, i64, Vec<i64>) {
    let mut graph = EntityGraph::new();
    let top_group = graph.create_entity(EntityKind::Group, "root-group").id;

    let mut previous = top_group;
    for i in 0..group_depth {
        let group = graph.create_entity(EntityKind::Group, format!("group-{i}")).id;
        graph.add_membership(group, previous).unwrap();
        previous = group;
    }
    let user = graph.create_entity(EntityKind::User, "bench-user").id;
    graph.add_membership(user, previous).unwrap();

    let mut resource_ids = Vec::with_capacity(resource_count);
    for i in 0..resource_count {
        let resource = graph.create_resource(format!("/resource-{i}/{{id}}"), "document", None).unwrap();
        resource_ids.push(resource.id);
    }
    graph.set_permission(Permission::grant(top_group, resource_ids[0], Verb::Get, "https")).unwrap();

    (graph, user, resource_ids)
}

fn ancestor_walk_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("ancestor_walk");
    let (graph, user, _) = build_graph(50, 10);

    group.bench_function("ancestors_depth_50", |bencher| {
        bencher.iter(|| {
            let ancestors = graph.ancestors(black_box(user));
            black_box(ancestors);
        });
    });

    group.finish();
}

fn evaluate_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("evaluate");
    let (graph, user, resource_ids) = build_graph(20, 100);
    let matching_uri = format!("/resource-0/{}", resource_ids[0]);

    group.bench_function("allowed_via_inherited_grant", |bencher| {
        bencher.iter(|| {
            let outcome =
                PermissionEvaluator::evaluate(black_box(&graph), black_box(user), black_box(&matching_uri), Verb::Get, "https");
            black_box(outcome).unwrap();
        });
    });

    group.bench_function("no_match", |bencher| {
        bencher.iter(|| {
            let outcome = PermissionEvaluator::evaluate(black_box(&graph), black_box(user), "/nowhere", Verb::Get, "https");
            black_box(outcome).unwrap();
        });
    });

    group.finish();
}

fn cache_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("permission_cache");
    let cache = PermissionCache::new(100_000, std::time::Duration::from_secs(300));
    let key = CacheKey { entity_id: 1, uri: "/resource-0/1".to_string(), verb: Verb::Get };
    let outcome = acs_core::types::EvaluationOutcome::Allowed {
        reason: "bench".to_string(),
        inherited_from: None,
        inheritance_chain: vec![],
    };
    cache.put(key.clone(), outcome);

    group.bench_function("hit", |bencher| {
        bencher.iter(|| {
            let result = cache.get(black_box(&key));
            black_box(result);
        });
    });

    group.finish();
}

criterion_group!(benches, ancestor_walk_benchmark, evaluate_benchmark, cache_benchmark);
criterion_main!(benches);
