// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! End-to-end scenarios exercising the full engine: command buffer, graph,
//! cache, audit trail, and the in-memory repository together.

use std::sync::Arc;
use std::time::Duration;

use acs_core::config::AcsConfig;
use acs_core::types::{AuditFilter, EntityKind, Verb};
use acs_engine::AcsEngine;
use acs_repository::InMemoryRepository;

async fn test_engine() -> AcsEngine {
    AcsEngine::new(AcsConfig::default(), Arc::new(InMemoryRepository::new())).await.unwrap()
}

#[tokio::test]
async fn group_membership_grants_inherited_access() {
    let engine = test_engine().await;
    let group = engine.create_entity(EntityKind::Group, "engineering", "admin").await.unwrap();
    let user = engine.create_entity(EntityKind::User, "alice", "admin").await.unwrap();
    engine.add_membership(user.id, group.id, "admin").await.unwrap();
    let resource = engine.create_resource("/documents/*", "document", None, "admin").await.unwrap();
    engine.grant(group.id, resource.id, Verb::Get, "https", "admin").await.unwrap();

    let outcome = engine.evaluate(user.id, "/documents/42", Verb::Get, "https").await.unwrap();
    assert!(outcome.is_allowed());
}

#[tokio::test]
async fn explicit_deny_overrides_inherited_grant() {
    let engine = test_engine().await;
    let group = engine.create_entity(EntityKind::Group, "engineering", "admin").await.unwrap();
    let user = engine.create_entity(EntityKind::User, "bob", "admin").await.unwrap();
    engine.add_membership(user.id, group.id, "admin").await.unwrap();
    let resource = engine.create_resource("/documents/42", "document", None, "admin").await.unwrap();
    engine.grant(group.id, resource.id, Verb::Get, "https", "admin").await.unwrap();
    engine.deny(user.id, resource.id, Verb::Get, "https", "admin").await.unwrap();

    let outcome = engine.evaluate(user.id, "/documents/42", Verb::Get, "https").await.unwrap();
    assert!(!outcome.is_allowed());
}

#[tokio::test]
async fn cyclic_membership_is_rejected_through_the_command_buffer() {
    let engine = test_engine().await;
    let a = engine.create_entity(EntityKind::Group, "a", "admin").await.unwrap();
    let b = engine.create_entity(EntityKind::Group, "b", "admin").await.unwrap();
    engine.add_membership(b.id, a.id, "admin").await.unwrap();

    let err = engine.add_membership(a.id, b.id, "admin").await.unwrap_err();
    assert_eq!(err.kind, acs_core::error::ErrorKind::CycleDetected);
}

#[tokio::test]
async fn cache_is_invalidated_when_a_permission_changes() {
    let engine = test_engine().await;
    let user = engine.create_entity(EntityKind::User, "carol", "admin").await.unwrap();
    let resource = engine.create_resource("/reports/1", "report", None, "admin").await.unwrap();

    let before = engine.evaluate(user.id, "/reports/1", Verb::Get, "https").await.unwrap();
    assert!(!before.is_allowed());

    engine.grant(user.id, resource.id, Verb::Get, "https", "admin").await.unwrap();

    let after = engine.evaluate(user.id, "/reports/1", Verb::Get, "https").await.unwrap();
    assert!(after.is_allowed());
}

#[tokio::test]
async fn mutations_are_applied_in_submission_order() {
    let engine = test_engine().await;
    let user = engine.create_entity(EntityKind::User, "dave", "admin").await.unwrap();
    let resource = engine.create_resource("/x", "doc", None, "admin").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let verb = if i % 2 == 0 { Verb::Get } else { Verb::Post };
        handles.push(engine.grant(user.id, resource.id, verb, "https", "admin"));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert!(engine.evaluate(user.id, "/x", Verb::Get, "https").await.unwrap().is_allowed());
    assert!(engine.evaluate(user.id, "/x", Verb::Post, "https").await.unwrap().is_allowed());
}

#[tokio::test]
async fn audit_chain_records_every_mutation_and_validates_clean() {
    let engine = test_engine().await;
    let user = engine.create_entity(EntityKind::User, "erin", "admin").await.unwrap();
    let resource = engine.create_resource("/y", "doc", None, "admin").await.unwrap();
    engine.grant(user.id, resource.id, Verb::Get, "https", "admin").await.unwrap();
    engine.revoke_permission(user.id, resource.id, Verb::Get, "https", "admin").await.unwrap();

    let records = engine.query_audit(&AuditFilter::default()).await.unwrap();
    assert_eq!(records.len(), 4);

    let report = engine.validate_audit_integrity().await.unwrap();
    assert!(report.is_clean());
}

#[tokio::test]
async fn retention_purge_preserves_security_prefixed_records() {
    let engine = test_engine().await;
    let user = engine.create_entity(EntityKind::User, "frank", "admin").await.unwrap();
    let _ = user;

    let report = engine.purge_audit("system:retention").await.unwrap();
    // Every record so far is fresh, so nothing is purge-eligible yet.
    assert_eq!(report.deleted_count, 0);

    let records = engine.query_audit(&AuditFilter::default()).await.unwrap();
    assert!(records.iter().any(|r| r.change_type == "SYSTEM:PURGE"));
}

#[tokio::test]
async fn suspicious_activity_detection_flags_subjects_with_repeated_access_denials() {
    let engine = test_engine().await;
    let user = engine.create_entity(EntityKind::User, "grace", "admin").await.unwrap();
    let resource = engine.create_resource("/z", "doc", None, "admin").await.unwrap();
    // No grant exists, so every verb check below evaluates to Denied and is
    // recorded as its own ACCESS_DENIED audit entry.
    for verb in [Verb::Get, Verb::Post, Verb::Put, Verb::Delete, Verb::Patch] {
        let outcome = engine.evaluate(user.id, "/z", verb, "https").await.unwrap();
        assert!(!outcome.is_allowed());
    }

    let flagged = engine.detect_suspicious_activity(5, chrono::Duration::minutes(5)).await.unwrap();
    assert!(flagged.contains(&user.id.to_string()));
}

#[tokio::test]
async fn command_buffer_rejects_submissions_once_saturated() {
    let repository = Arc::new(InMemoryRepository::new());
    let config = AcsConfig { command_queue_capacity: 1, ..AcsConfig::default() };
    let engine = Arc::new(AcsEngine::new(config, repository).await.unwrap());

    // Fire concurrent submissions at a single-slot queue; at least one
    // should be rejected as overloaded rather than queued unbounded.
    let mut handles = Vec::new();
    for i in 0..50 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move { engine.create_entity(EntityKind::User, format!("user-{i}"), "admin").await }));
    }
    let mut overloaded = 0;
    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) if e.kind == acs_core::error::ErrorKind::Backpressure => overloaded += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(overloaded + succeeded, 50);
    assert!(succeeded > 0);
    let _ = Duration::from_millis(0);
}
