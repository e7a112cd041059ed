// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! # acs-core
//!
//! Pure, synchronous domain logic for the Access Control Service: the
//! entity graph, the permission evaluator, the permission cache, and the
//! shared types/config/error surface the rest of the workspace builds on.
//!
//! This crate has no knowledge of tokio, axum, or sqlx — concurrency
//! (the single-writer command buffer), the audit trail, resilience, and
//! persistence live in `acs-engine` and `acs-repository`, which wrap the
//! types here.
//!
//! ## Quick start
//!
//! ```rust
//! use acs_core::graph::EntityGraph;
//! use acs_core::evaluator::PermissionEvaluator;
//! use acs_core::types::{EntityKind, Permission, Verb};
//!
//! let mut graph = EntityGraph::new();
//! let group = graph.create_entity(EntityKind::Group, "engineering");
//! let user = graph.create_entity(EntityKind::User, "alice");
//! graph.add_membership(user.id, group.id).unwrap();
//!
//! let resource = graph.create_resource("/documents/42", "document", None).unwrap();
//! graph.set_permission(Permission::grant(group.id, resource.id, Verb::Get, "https")).unwrap();
//!
//! let outcome = PermissionEvaluator::evaluate(&graph, user.id, "/documents/42", Verb::Get, "https").unwrap();
//! assert!(outcome.is_allowed());
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod types;

pub use config::AcsConfig;
pub use error::{AcsError, ErrorKind, Result};
pub use evaluator::PermissionEvaluator;
pub use graph::EntityGraph;
pub use types::{
    AuditFilter, AuditRecord, AuditStats, CacheKey, CacheStats, Entity, EntityId, EntityKind,
    EvaluationOutcome, ExportFormat, IntegrityReport, MutationEffect, Permission, PurgeReport,
    Resource, ResourceId, Verb,
};
