// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Maps each [`Command`] onto an [`EntityGraph`] mutation, producing the
//! [`Change`] and [`AuditRecord`] the writer task persists together, plus the
//! [`MutationEffect`] that drives cache invalidation.
//!
//! This module is pure and synchronous: it never touches the repository,
//! the cache, or the audit trail's persisted state directly. The writer task
//! in [`crate::buffer`] is the only caller, and it already holds the graph
//! lock for the duration of the call.

use acs_core::error::Result;
use acs_core::graph::EntityGraph;
use acs_core::types::MutationEffect;
use acs_core::AuditRecord;
use acs_repository::Change;

use crate::audit::AuditTrail;
use crate::command::{Command, CommandOutcome};

/// Apply `command` to `graph`, returning the resulting [`Change`] (for
/// persistence), the [`AuditRecord`] the trail assigned it, the
/// [`MutationEffect`] (for cache invalidation), and the value the original
/// submitter observes.
///
/// On error, `graph` is left exactly as it was before the call — every
/// mutation method on `EntityGraph` either fully applies or returns early
/// without partial effect, so there is nothing to roll back here.
pub fn apply(graph: &mut EntityGraph, audit: &AuditTrail, command: Command) -> Result<(Change, AuditRecord, MutationEffect, CommandOutcome)> {
    let requested_by = command.requested_by().to_string();

    match command {
        Command::CreateEntity { kind, name, .. } => {
            let entity = graph.create_entity(kind, &name);
            let effect = MutationEffect::touching([entity.id], format!("created entity {}", entity.id));
            let record = audit.next_record(
                "ENTITY:CREATE",
                kind.as_str(),
                Some(entity.id),
                requested_by,
                serde_json::json!({ "name": entity.name }),
            );
            Ok((Change::UpsertEntity(entity.clone()), record, effect, CommandOutcome::Entity(entity)))
        }

        Command::RenameEntity { id, name, .. } => {
            let effect = graph.rename_entity(id, &name)?;
            let entity = graph.get_entity(id)?.clone();
            let record = audit.next_record(
                "ENTITY:RENAME",
                entity.kind.as_str(),
                Some(id),
                requested_by,
                serde_json::json!({ "name": entity.name }),
            );
            Ok((Change::UpsertEntity(entity.clone()), record, effect, CommandOutcome::Entity(entity)))
        }

        Command::DeleteEntity { id, force, .. } => {
            let entity_kind = graph.get_entity(id)?.kind;
            let effect = graph.delete_entity(id, force)?;
            let record =
                audit.next_record("ENTITY:DELETE", entity_kind.as_str(), Some(id), requested_by, serde_json::json!({ "force": force }));
            Ok((Change::DeleteEntity(id), record, effect, CommandOutcome::Acknowledged))
        }

        Command::CreateResource { uri_pattern, resource_type, parent_resource_id, .. } => {
            let resource = graph.create_resource(&uri_pattern, &resource_type, parent_resource_id)?;
            let effect = MutationEffect::bulk(format!("created resource {}", resource.id));
            let record = audit.next_record(
                "RESOURCE:CREATE",
                "Resource",
                None,
                requested_by,
                serde_json::json!({ "uri_pattern": resource.uri_pattern, "resource_type": resource.resource_type }),
            );
            Ok((Change::UpsertResource(resource.clone()), record, effect, CommandOutcome::Resource(resource)))
        }

        Command::DeleteResource { id, force, .. } => {
            let effect = graph.delete_resource(id, force)?;
            let record = audit.next_record(
                "RESOURCE:DELETE",
                "Resource",
                None,
                requested_by,
                serde_json::json!({ "resource_id": id, "force": force }),
            );
            Ok((Change::DeleteResource(id), record, effect, CommandOutcome::Acknowledged))
        }

        Command::AddMembership { child, parent, .. } => {
            let effect = graph.add_membership(child, parent)?;
            let record = audit.next_record(
                "MEMBERSHIP:ADD",
                "Membership",
                Some(child),
                requested_by,
                serde_json::json!({ "child": child, "parent": parent }),
            );
            Ok((Change::AddMembership { child, parent }, record, effect, CommandOutcome::Acknowledged))
        }

        Command::RemoveMembership { child, parent, .. } => {
            let effect = graph.remove_membership(child, parent)?;
            let record = audit.next_record(
                "MEMBERSHIP:REMOVE",
                "Membership",
                Some(child),
                requested_by,
                serde_json::json!({ "child": child, "parent": parent }),
            );
            Ok((Change::RemoveMembership { child, parent }, record, effect, CommandOutcome::Acknowledged))
        }

        Command::SetPermission { permission, .. } => {
            let effect = graph.set_permission(permission.clone())?;
            let change_type = if permission.deny { "PERMISSION:DENY" } else { "PERMISSION:GRANT" };
            let record = audit.next_record(
                change_type,
                "Permission",
                Some(permission.entity_id),
                requested_by,
                serde_json::json!({
                    "resource_id": permission.resource_id,
                    "verb": permission.verb,
                    "scheme": permission.scheme,
                }),
            );
            Ok((Change::SetPermission(permission), record, effect, CommandOutcome::Acknowledged))
        }

        Command::RevokePermission { entity_id, resource_id, verb, scheme, .. } => {
            let effect = graph.revoke_permission(entity_id, resource_id, verb, &scheme)?;
            let record = audit.next_record(
                "PERMISSION:REVOKE",
                "Permission",
                Some(entity_id),
                requested_by,
                serde_json::json!({ "resource_id": resource_id, "verb": verb, "scheme": scheme }),
            );
            Ok((Change::RevokePermission { entity_id, resource_id, verb, scheme }, record, effect, CommandOutcome::Acknowledged))
        }

        Command::PurgeAudit { .. } => {
            // Purge is handled specially by the writer task: it needs the
            // full audit history from the repository to decide eligibility,
            // which this graph-only handler has no access to.
            unreachable!("PurgeAudit is intercepted by the writer task before reaching apply()")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs_core::types::EntityKind;

    #[test]
    fn create_entity_produces_matching_change_and_audit_record() {
        let mut graph = EntityGraph::new();
        let audit = AuditTrail::resume(None);
        let command = Command::CreateEntity { kind: EntityKind::User, name: "alice".into(), requested_by: "tester".into() };

        let (change, record, effect, outcome) = apply(&mut graph, &audit, command).unwrap();

        assert!(matches!(change, Change::UpsertEntity(ref e) if e.name == "alice"));
        assert_eq!(record.change_type, "ENTITY:CREATE");
        assert!(!effect.touched_entities.is_empty());
        assert!(matches!(outcome, CommandOutcome::Entity(ref e) if e.name == "alice"));
    }

    #[test]
    fn rejecting_a_cycle_leaves_graph_untouched() {
        let mut graph = EntityGraph::new();
        let audit = AuditTrail::resume(None);
        let a = graph.create_entity(EntityKind::Group, "a").id;
        let b = graph.create_entity(EntityKind::Group, "b").id;
        graph.add_membership(b, a).unwrap();

        let command = Command::AddMembership { child: a, parent: b, requested_by: "tester".into() };
        let err = apply(&mut graph, &audit, command).unwrap_err();
        assert_eq!(err.kind, acs_core::error::ErrorKind::CycleDetected);
        assert_eq!(graph.direct_parents(a), Vec::<i64>::new());
    }
}
