// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Shared data types for the entity graph, permission evaluator, and audit
//! trail.
//!
//! All wire-facing types implement [`Clone`], [`Debug`], [`serde::Serialize`],
//! and [`serde::Deserialize`] so they can be sent across the command channel,
//! persisted via the repository gateway, and serialised over HTTP without
//! additional conversion steps.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Stable identifier shared by every entity kind.
///
/// Users, Groups, and Roles draw from one id space (I1) so that a
/// [`Permission`]'s `entity_id` can address any of them without a tag.
pub type EntityId = i64;

/// Stable identifier for a [`Resource`].
pub type ResourceId = i64;

/// Stable identifier for an [`AuditRecord`].
pub type AuditId = i64;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// The concrete kind of an [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Group,
    Role,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Group => "Group",
            EntityKind::Role => "Role",
        }
    }
}

/// A principal in the access-control graph: a [`EntityKind::User`],
/// [`EntityKind::Group`], or [`EntityKind::Role`].
///
/// Every entity shares the [`EntityId`] space regardless of kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub deleted: bool,
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A URI pattern and the resource type it denotes.
///
/// `uri_pattern` is a `/`-separated sequence of literal segments,
/// `{name}` parameter segments (matching exactly one path segment), and an
/// optional trailing `*` wildcard (matching one or more trailing segments).
/// Patterns with unbalanced braces are rejected at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub uri_pattern: String,
    pub resource_type: String,
    pub parent_resource_id: Option<ResourceId>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// HTTP-style verb a [`Permission`] may grant or deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

/// A single grant or deny rule attached to an [`Entity`].
///
/// Exactly one of `grant`/`deny` is `true` (I3). At most one `Permission`
/// exists per `(entity_id, resource_id, verb, scheme)` tuple (I6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub entity_id: EntityId,
    pub resource_id: ResourceId,
    pub verb: Verb,
    pub scheme: String,
    pub grant: bool,
    pub deny: bool,
}

impl Permission {
    /// Construct a grant permission, enforcing I3 by construction.
    pub fn grant(entity_id: EntityId, resource_id: ResourceId, verb: Verb, scheme: impl Into<String>) -> Self {
        Self { entity_id, resource_id, verb, scheme: scheme.into(), grant: true, deny: false }
    }

    /// Construct a deny permission, enforcing I3 by construction.
    pub fn deny(entity_id: EntityId, resource_id: ResourceId, verb: Verb, scheme: impl Into<String>) -> Self {
        Self { entity_id, resource_id, verb, scheme: scheme.into(), grant: false, deny: true }
    }

    pub fn key(&self) -> (EntityId, ResourceId, Verb, String) {
        (self.entity_id, self.resource_id, self.verb, self.scheme.clone())
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Outcome of [`crate::evaluator::PermissionEvaluator::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Allowed {
        reason: String,
        inherited_from: Option<EntityId>,
        inheritance_chain: Vec<EntityId>,
    },
    Denied {
        reason: String,
        inherited_from: Option<EntityId>,
        inheritance_chain: Vec<EntityId>,
    },
    NoMatch {
        reason: String,
    },
}

impl EvaluationOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, EvaluationOutcome::Allowed { .. })
    }

    pub fn reason(&self) -> &str {
        match self {
            EvaluationOutcome::Allowed { reason, .. }
            | EvaluationOutcome::Denied { reason, .. }
            | EvaluationOutcome::NoMatch { reason } => reason,
        }
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// An immutable, hash-chained record of a single change to the entity graph.
///
/// `hash = SHA-256(id || timestamp || change_type || entity_type ||
/// entity_id || changed_by || details || prev_hash)` (I4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: AuditId,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub change_type: String,
    pub entity_type: String,
    pub entity_id: Option<EntityId>,
    pub changed_by: String,
    pub change_details: serde_json::Value,
    pub prev_hash: String,
    pub hash: String,
}

/// Filter used to narrow audit queries.
///
/// All set predicates are AND-ed together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    pub entity_id: Option<EntityId>,
    pub changed_by: Option<String>,
    pub change_type_prefix: Option<String>,
    pub since: Option<chrono::DateTime<chrono::Utc>>,
    pub until: Option<chrono::DateTime<chrono::Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Report produced by audit chain integrity validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub records_checked: usize,
    pub hash_chain_broken_at: Vec<AuditId>,
    pub missing_ids: Vec<(AuditId, AuditId)>,
    pub malformed_details_at: Vec<AuditId>,
    pub duplicate_hashes_at: Vec<AuditId>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.hash_chain_broken_at.is_empty()
            && self.missing_ids.is_empty()
            && self.malformed_details_at.is_empty()
            && self.duplicate_hashes_at.is_empty()
    }
}

/// Result of a retention purge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeReport {
    pub deleted_count: usize,
    pub purge_record_id: AuditId,
}

/// Aggregate statistics over the audit chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditStats {
    pub total_records: usize,
    pub unique_users: usize,
    pub unique_entities: usize,
    pub security_events: usize,
    pub data_events: usize,
}

/// Export serialisation format for audit export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Key under which a [`EvaluationOutcome`] is memoised by the permission
/// cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub entity_id: EntityId,
    pub uri: String,
    pub verb: Verb,
}

/// Snapshot of [`crate::cache::PermissionCache`] counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

// ---------------------------------------------------------------------------
// Mutation effects
// ---------------------------------------------------------------------------

/// Describes which entities' cached decisions a mutation may have
/// invalidated, so the cache and the repository write-through path can act
/// on the same description of "what changed" (I5: invalidation is computed
/// from this before the mutation's effects become externally visible).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationEffect {
    pub description: String,
    pub touched_entities: HashSet<EntityId>,
    /// When set, every cache entry for the tenant is invalidated rather than
    /// walking descendants individually (used for wide-blast mutations like
    /// adding a group to another group, which can affect an unbounded
    /// subtree).
    pub bulk_invalidate: bool,
}

impl MutationEffect {
    pub fn touching(entities: impl IntoIterator<Item = EntityId>, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            touched_entities: entities.into_iter().collect(),
            bulk_invalidate: false,
        }
    }

    pub fn bulk(description: impl Into<String>) -> Self {
        Self { description: description.into(), touched_entities: HashSet::new(), bulk_invalidate: true }
    }
}
