// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Commands accepted by the single-writer [`crate::buffer::CommandBuffer`].
//!
//! Every mutating operation on the entity graph is expressed as a
//! [`Command`]. Submitting one guarantees it is applied strictly after every
//! command submitted before it and strictly before every command submitted
//! after it (FIFO), and that the submitter observes its own effects before
//! [`crate::buffer::CommandBuffer::submit`] returns (read-your-writes).

use acs_core::types::{EntityId, EntityKind, Permission, ResourceId, Verb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    CreateEntity { kind: EntityKind, name: String, requested_by: String },
    RenameEntity { id: EntityId, name: String, requested_by: String },
    DeleteEntity { id: EntityId, force: bool, requested_by: String },
    CreateResource { uri_pattern: String, resource_type: String, parent_resource_id: Option<ResourceId>, requested_by: String },
    DeleteResource { id: ResourceId, force: bool, requested_by: String },
    AddMembership { child: EntityId, parent: EntityId, requested_by: String },
    RemoveMembership { child: EntityId, parent: EntityId, requested_by: String },
    SetPermission { permission: Permission, requested_by: String },
    RevokePermission { entity_id: EntityId, resource_id: ResourceId, verb: Verb, scheme: String, requested_by: String },
    PurgeAudit { requested_by: String },
}

impl Command {
    pub fn requested_by(&self) -> &str {
        match self {
            Command::CreateEntity { requested_by, .. }
            | Command::RenameEntity { requested_by, .. }
            | Command::DeleteEntity { requested_by, .. }
            | Command::CreateResource { requested_by, .. }
            | Command::DeleteResource { requested_by, .. }
            | Command::AddMembership { requested_by, .. }
            | Command::RemoveMembership { requested_by, .. }
            | Command::SetPermission { requested_by, .. }
            | Command::RevokePermission { requested_by, .. }
            | Command::PurgeAudit { requested_by } => requested_by,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Command::CreateEntity { kind, name, .. } => format!("CreateEntity({kind:?}, {name})"),
            Command::RenameEntity { id, .. } => format!("RenameEntity({id})"),
            Command::DeleteEntity { id, .. } => format!("DeleteEntity({id})"),
            Command::CreateResource { uri_pattern, .. } => format!("CreateResource({uri_pattern})"),
            Command::DeleteResource { id, .. } => format!("DeleteResource({id})"),
            Command::AddMembership { child, parent, .. } => format!("AddMembership({child} -> {parent})"),
            Command::RemoveMembership { child, parent, .. } => format!("RemoveMembership({child} -> {parent})"),
            Command::SetPermission { permission, .. } => format!("SetPermission({:?})", permission.key()),
            Command::RevokePermission { entity_id, resource_id, verb, scheme, .. } => {
                format!("RevokePermission({entity_id}, {resource_id}, {verb:?}, {scheme})")
            }
            Command::PurgeAudit { .. } => "PurgeAudit".to_string(),
        }
    }
}

/// The value a successfully applied [`Command`] resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CommandOutcome {
    Entity(acs_core::types::Entity),
    Resource(acs_core::types::Resource),
    Acknowledged,
    Purged(acs_core::types::PurgeReport),
}
