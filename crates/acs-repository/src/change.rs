// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! The durable representation of a single entity-graph mutation.
//!
//! `acs-engine` produces one [`Change`] per applied command and hands it,
//! together with the [`AuditRecord`] the audit trail assigned to it, to a
//! [`crate::Repository`] for write-through persistence. A [`Change`] mirrors
//! the mutation methods on `acs_core::graph::EntityGraph` closely enough
//! that replaying a persisted stream of changes reconstructs the graph.

use acs_core::types::{Entity, EntityId, Permission, Resource, ResourceId, Verb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Change {
    UpsertEntity(Entity),
    DeleteEntity(EntityId),
    UpsertResource(Resource),
    DeleteResource(ResourceId),
    AddMembership { child: EntityId, parent: EntityId },
    RemoveMembership { child: EntityId, parent: EntityId },
    SetPermission(Permission),
    RevokePermission { entity_id: EntityId, resource_id: ResourceId, verb: Verb, scheme: String },
    /// No graph mutation — carries only an audit record (e.g. an access
    /// decision worth keeping for [`acs_core::AuditRecord`]-based analysis
    /// such as suspicious-activity detection). A no-op on replay.
    AuditOnly,
}

/// A full materialised view of one tenant's graph, returned by
/// [`crate::Repository::load_snapshot`] on startup so `acs-engine` can
/// rebuild its in-memory [`acs_core::graph::EntityGraph`] without replaying
/// the entire audit history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub entities: Vec<Entity>,
    pub resources: Vec<Resource>,
    pub memberships: Vec<(EntityId, EntityId)>,
    pub permissions: Vec<Permission>,
}
