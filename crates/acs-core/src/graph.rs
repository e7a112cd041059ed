// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! In-memory entity graph: users, groups, roles, resources, memberships, and
//! permissions for a single tenant.
//!
//! [`EntityGraph`] is the sole owner of this state. It is deliberately
//! synchronous — the single-writer command buffer in `acs-engine` is the only
//! caller that ever takes it mutably, so every method here can assume
//! exclusive access for the duration of the call and never needs to reason
//! about interleaving.

use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::error::{AcsError, Result};
use crate::types::{Entity, EntityId, EntityKind, MutationEffect, Permission, Resource, ResourceId, Verb};

/// The full access-control graph for one tenant.
///
/// Memberships are stored as child → set-of-parents (`memberships`) so that
/// ancestor enumeration for a given entity is a direct lookup, and as
/// parent → set-of-children (`children`) so that cycle detection and
/// cascading deletes can walk downward without scanning every entity.
#[derive(Debug, Default)]
pub struct EntityGraph {
    entities: HashMap<EntityId, Entity>,
    resources: HashMap<ResourceId, Resource>,
    /// child id -> set of parent ids (a User/Role can belong to many Groups;
    /// a Role can be granted to many Groups).
    memberships: HashMap<EntityId, HashSet<EntityId>>,
    /// parent id -> set of child ids, the inverse of `memberships`.
    children: HashMap<EntityId, HashSet<EntityId>>,
    permissions: HashMap<(EntityId, ResourceId, Verb, String), Permission>,
    next_entity_id: EntityId,
    next_resource_id: ResourceId,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self { next_entity_id: 1, next_resource_id: 1, ..Default::default() }
    }

    // -----------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------

    /// Create a new entity and assign it the next id in this graph's id
    /// space (I1: unique across Users, Groups, and Roles alike).
    pub fn create_entity(&mut self, kind: EntityKind, name: impl Into<String>) -> Entity {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        let now = Utc::now();
        let entity = Entity { id, kind, name: name.into(), created_at: now, updated_at: now, deleted: false };
        self.entities.insert(id, entity.clone());
        self.memberships.entry(id).or_default();
        self.children.entry(id).or_default();
        entity
    }

    pub fn get_entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities
            .get(&id)
            .filter(|e| !e.deleted)
            .ok_or_else(|| AcsError::not_found(format!("entity {id} not found")))
    }

    pub fn entity_exists(&self, id: EntityId) -> bool {
        self.entities.get(&id).map(|e| !e.deleted).unwrap_or(false)
    }

    pub fn rename_entity(&mut self, id: EntityId, name: impl Into<String>) -> Result<MutationEffect> {
        let entity = self
            .entities
            .get_mut(&id)
            .filter(|e| !e.deleted)
            .ok_or_else(|| AcsError::not_found(format!("entity {id} not found")))?;
        entity.name = name.into();
        entity.updated_at = Utc::now();
        Ok(MutationEffect::touching([id], format!("renamed entity {id}")))
    }

    /// Soft-delete an entity: it, its memberships, and its direct
    /// permissions are removed from evaluation, but its id is never reused
    /// and historical audit records referencing it remain valid.
    ///
    /// Rejects with `ErrorKind::DependenciesExist` when `id` still has
    /// children (other entities hold it as a member's parent — a Group or
    /// Role other members depend on) or owns permissions directly, unless
    /// `force` is set. `force` cascades through both: children are detached
    /// from `id` and its owned permissions are dropped along with it.
    pub fn delete_entity(&mut self, id: EntityId, force: bool) -> Result<MutationEffect> {
        {
            let entity = self
                .entities
                .get_mut(&id)
                .filter(|e| !e.deleted)
                .ok_or_else(|| AcsError::not_found(format!("entity {id} not found")))?;
            if !force {
                let has_children = self.children.get(&id).map(|c| !c.is_empty()).unwrap_or(false);
                let has_permissions = self.permissions.keys().any(|(entity_id, _, _, _)| *entity_id == id);
                if has_children || has_permissions {
                    return Err(AcsError::dependencies_exist(format!(
                        "entity {id} still has dependents (children and/or owned permissions); pass force to cascade"
                    )));
                }
            }
            entity.deleted = true;
            entity.updated_at = Utc::now();
        }

        let mut touched = HashSet::new();
        touched.insert(id);

        if let Some(parents) = self.memberships.remove(&id) {
            for parent in &parents {
                if let Some(kids) = self.children.get_mut(parent) {
                    kids.remove(&id);
                }
            }
        }
        if let Some(kids) = self.children.remove(&id) {
            for child in &kids {
                if let Some(parents) = self.memberships.get_mut(child) {
                    parents.remove(&id);
                }
                touched.insert(*child);
            }
        }
        self.permissions.retain(|(entity_id, _, _, _), _| *entity_id != id);

        Ok(MutationEffect::touching(touched, format!("deleted entity {id}")))
    }

    /// Re-insert an [`Entity`] loaded from a repository snapshot, preserving
    /// its existing id rather than minting a new one. Bumps the id counter
    /// so subsequently created entities never collide with restored ones.
    pub fn restore_entity(&mut self, entity: Entity) {
        self.next_entity_id = self.next_entity_id.max(entity.id + 1);
        self.memberships.entry(entity.id).or_default();
        self.children.entry(entity.id).or_default();
        self.entities.insert(entity.id, entity);
    }

    pub fn list_entities(&self, kind: Option<EntityKind>) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| !e.deleted)
            .filter(|e| kind.map(|k| e.kind == k).unwrap_or(true))
            .collect()
    }

    // -----------------------------------------------------------------
    // Memberships (I2: the membership graph must remain acyclic)
    // -----------------------------------------------------------------

    /// Add `child` as a member of `parent` (user-in-group, role-on-group,
    /// group-in-group).
    ///
    /// Rejects the edge with `ErrorKind::CycleDetected` if `parent` is
    /// already reachable from `child` — adding the edge would otherwise
    /// create a cycle (I2).
    pub fn add_membership(&mut self, child: EntityId, parent: EntityId) -> Result<MutationEffect> {
        if !self.entity_exists(child) {
            return Err(AcsError::not_found(format!("entity {child} not found")));
        }
        if !self.entity_exists(parent) {
            return Err(AcsError::not_found(format!("entity {parent} not found")));
        }
        if child == parent {
            return Err(AcsError::invalid_argument("an entity cannot be a member of itself"));
        }
        if self.memberships.get(&child).map(|p| p.contains(&parent)).unwrap_or(false) {
            return Ok(MutationEffect::touching([child], "membership already present"));
        }
        if self.is_reachable(parent, child) {
            return Err(AcsError::cycle_detected(format!(
                "adding {child} as a member of {parent} would create a cycle"
            )));
        }

        self.memberships.entry(child).or_default().insert(parent);
        self.children.entry(parent).or_default().insert(child);

        Ok(MutationEffect::bulk(format!("added membership {child} -> {parent}")))
    }

    pub fn remove_membership(&mut self, child: EntityId, parent: EntityId) -> Result<MutationEffect> {
        let removed = self.memberships.get_mut(&child).map(|p| p.remove(&parent)).unwrap_or(false);
        if removed {
            if let Some(kids) = self.children.get_mut(&parent) {
                kids.remove(&child);
            }
        }
        Ok(MutationEffect::bulk(format!("removed membership {child} -> {parent}")))
    }

    /// Iterative DFS: is `target` reachable from `start` by following
    /// parent edges? Used to reject cycle-forming memberships before they
    /// are inserted.
    fn is_reachable(&self, start: EntityId, target: EntityId) -> bool {
        if start == target {
            return true;
        }
        let mut stack = vec![start];
        let mut visited = HashSet::new();
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if current == target {
                return true;
            }
            if let Some(parents) = self.memberships.get(&current) {
                stack.extend(parents.iter().copied());
            }
        }
        false
    }

    /// All ancestors of `id` (direct and transitive parents), used by the
    /// evaluator's BFS walk.
    pub fn ancestors(&self, id: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        let mut visited = HashSet::new();
        visited.insert(id);
        queue.push_back(id);
        while let Some(current) = queue.pop_front() {
            if let Some(parents) = self.memberships.get(&current) {
                for &parent in parents {
                    if visited.insert(parent) {
                        result.push(parent);
                        queue.push_back(parent);
                    }
                }
            }
        }
        result
    }

    pub fn direct_parents(&self, id: EntityId) -> Vec<EntityId> {
        self.memberships.get(&id).map(|p| p.iter().copied().collect()).unwrap_or_default()
    }

    pub fn direct_children(&self, id: EntityId) -> Vec<EntityId> {
        self.children.get(&id).map(|c| c.iter().copied().collect()).unwrap_or_default()
    }

    // -----------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------

    pub fn create_resource(
        &mut self,
        uri_pattern: impl Into<String>,
        resource_type: impl Into<String>,
        parent_resource_id: Option<ResourceId>,
    ) -> Result<Resource> {
        let uri_pattern = uri_pattern.into();
        validate_uri_pattern(&uri_pattern)?;
        if let Some(parent) = parent_resource_id {
            if !self.resources.contains_key(&parent) {
                return Err(AcsError::not_found(format!("resource {parent} not found")));
            }
        }
        let id = self.next_resource_id;
        self.next_resource_id += 1;
        let resource =
            Resource { id, uri_pattern, resource_type: resource_type.into(), parent_resource_id, created_at: Utc::now() };
        self.resources.insert(id, resource.clone());
        Ok(resource)
    }

    /// Re-insert a [`Resource`] loaded from a repository snapshot, preserving
    /// its existing id. Bumps the id counter the same way
    /// [`EntityGraph::restore_entity`] does.
    pub fn restore_resource(&mut self, resource: Resource) {
        self.next_resource_id = self.next_resource_id.max(resource.id + 1);
        self.resources.insert(resource.id, resource);
    }

    pub fn get_resource(&self, id: ResourceId) -> Result<&Resource> {
        self.resources.get(&id).ok_or_else(|| AcsError::not_found(format!("resource {id} not found")))
    }

    pub fn list_resources(&self) -> Vec<&Resource> {
        self.resources.values().collect()
    }

    /// Rejects with `ErrorKind::DependenciesExist` when `id` still has child
    /// resources (other resources with `parent_resource_id == Some(id)`) or
    /// permissions referencing it directly, unless `force` is set.
    pub fn delete_resource(&mut self, id: ResourceId, force: bool) -> Result<MutationEffect> {
        if !self.resources.contains_key(&id) {
            return Err(AcsError::not_found(format!("resource {id} not found")));
        }
        if !force {
            let has_children = self.resources.values().any(|r| r.parent_resource_id == Some(id));
            let has_permissions = self.permissions.keys().any(|(_, rid, _, _)| *rid == id);
            if has_children || has_permissions {
                return Err(AcsError::dependencies_exist(format!(
                    "resource {id} still has dependents (child resources and/or permissions); pass force to cascade"
                )));
            }
        }
        self.resources.remove(&id);
        let touched: HashSet<EntityId> =
            self.permissions.keys().filter(|(_, rid, _, _)| *rid == id).map(|(eid, _, _, _)| *eid).collect();
        self.permissions.retain(|(_, rid, _, _), _| *rid != id);
        Ok(MutationEffect::touching(touched, format!("deleted resource {id}")))
    }

    // -----------------------------------------------------------------
    // Permissions (I3: grant XOR deny, I6: uniqueness)
    // -----------------------------------------------------------------

    /// Insert or replace the permission for
    /// `(entity_id, resource_id, verb, scheme)` (I6 — upsert on the unique
    /// key rather than accumulating duplicates).
    ///
    /// Bulk-invalidates the cache rather than touching only `entity_id`:
    /// when `entity_id` is a Group or Role, every member descending from it
    /// inherits the new decision, and the cache has no cheap way to
    /// enumerate that descendant set from here (see `MutationEffect::bulk`).
    pub fn set_permission(&mut self, permission: Permission) -> Result<MutationEffect> {
        if permission.grant == permission.deny {
            return Err(AcsError::invalid_argument("permission must be exactly one of grant or deny"));
        }
        if !self.entity_exists(permission.entity_id) {
            return Err(AcsError::not_found(format!("entity {} not found", permission.entity_id)));
        }
        if !self.resources.contains_key(&permission.resource_id) {
            return Err(AcsError::not_found(format!("resource {} not found", permission.resource_id)));
        }
        let entity_id = permission.entity_id;
        self.permissions.insert(permission.key(), permission);
        Ok(MutationEffect::bulk(format!("set permission for {entity_id}")))
    }

    /// See [`EntityGraph::set_permission`]: bulk-invalidates for the same
    /// reason — a revoked grant/deny on a Group or Role can change the
    /// decision observed by an unbounded set of descendants.
    pub fn revoke_permission(
        &mut self,
        entity_id: EntityId,
        resource_id: ResourceId,
        verb: Verb,
        scheme: &str,
    ) -> Result<MutationEffect> {
        self.permissions.remove(&(entity_id, resource_id, verb, scheme.to_string()));
        Ok(MutationEffect::bulk(format!("revoked permission for {entity_id}")))
    }

    /// Direct (non-inherited) permissions for `entity_id` against
    /// `resource_id`, across all verbs and schemes.
    pub fn direct_permissions(&self, entity_id: EntityId, resource_id: ResourceId) -> Vec<&Permission> {
        self.permissions
            .values()
            .filter(|p| p.entity_id == entity_id && p.resource_id == resource_id)
            .collect()
    }

    /// Every direct permission owned by `entity_id`, against any resource.
    pub fn permissions_for_entity(&self, entity_id: EntityId) -> Vec<&Permission> {
        self.permissions.values().filter(|p| p.entity_id == entity_id).collect()
    }

    pub fn all_permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.values()
    }

    pub fn all_resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }
}

/// Validate that `pattern` has balanced `{`/`}` braces, non-empty parameter
/// names, and a wildcard (`*`) only as the final segment.
fn validate_uri_pattern(pattern: &str) -> Result<()> {
    let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    for (i, segment) in segments.iter().enumerate() {
        if *segment == "*" {
            if i != segments.len() - 1 {
                return Err(AcsError::invalid_argument("wildcard '*' is only permitted as the final segment"));
            }
            continue;
        }
        if segment.starts_with('{') || segment.ends_with('}') {
            if !(segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2) {
                return Err(AcsError::invalid_argument(format!("malformed parameter segment: {segment}")));
            }
        } else if segment.contains('{') || segment.contains('}') {
            return Err(AcsError::invalid_argument(format!("unbalanced braces in segment: {segment}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_are_unique_across_kinds() {
        let mut graph = EntityGraph::new();
        let user = graph.create_entity(EntityKind::User, "alice");
        let group = graph.create_entity(EntityKind::Group, "engineering");
        assert_ne!(user.id, group.id);
    }

    #[test]
    fn membership_cycle_is_rejected() {
        let mut graph = EntityGraph::new();
        let a = graph.create_entity(EntityKind::Group, "a").id;
        let b = graph.create_entity(EntityKind::Group, "b").id;
        let c = graph.create_entity(EntityKind::Group, "c").id;
        graph.add_membership(b, a).unwrap();
        graph.add_membership(c, b).unwrap();
        let err = graph.add_membership(a, c).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::CycleDetected);
    }

    #[test]
    fn duplicate_membership_is_idempotent() {
        let mut graph = EntityGraph::new();
        let a = graph.create_entity(EntityKind::Group, "a").id;
        let b = graph.create_entity(EntityKind::User, "b").id;
        graph.add_membership(b, a).unwrap();
        graph.add_membership(b, a).unwrap();
        assert_eq!(graph.direct_parents(b), vec![a]);
    }

    #[test]
    fn ancestors_includes_transitive_parents() {
        let mut graph = EntityGraph::new();
        let a = graph.create_entity(EntityKind::Group, "a").id;
        let b = graph.create_entity(EntityKind::Group, "b").id;
        let c = graph.create_entity(EntityKind::User, "c").id;
        graph.add_membership(b, a).unwrap();
        graph.add_membership(c, b).unwrap();
        let mut ancestors = graph.ancestors(c);
        ancestors.sort();
        assert_eq!(ancestors, vec![a, b]);
    }

    #[test]
    fn set_permission_rejects_grant_and_deny_both_set() {
        let mut graph = EntityGraph::new();
        let user = graph.create_entity(EntityKind::User, "alice").id;
        let resource = graph.create_resource("/docs/1", "document", None).unwrap().id;
        let bad = Permission { entity_id: user, resource_id: resource, verb: Verb::Get, scheme: "https".into(), grant: true, deny: true };
        let err = graph.set_permission(bad).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidArgument);
    }

    #[test]
    fn deleting_entity_removes_its_memberships_and_permissions_with_force() {
        let mut graph = EntityGraph::new();
        let group = graph.create_entity(EntityKind::Group, "g").id;
        let user = graph.create_entity(EntityKind::User, "u").id;
        graph.add_membership(user, group).unwrap();
        let resource = graph.create_resource("/x", "doc", None).unwrap().id;
        graph.set_permission(Permission::grant(user, resource, Verb::Get, "https")).unwrap();

        graph.delete_entity(user, true).unwrap();

        assert!(!graph.entity_exists(user));
        assert!(graph.direct_children(group).is_empty());
        assert!(graph.permissions_for_entity(user).is_empty());
    }

    #[test]
    fn deleting_entity_with_owned_permissions_is_rejected_without_force() {
        let mut graph = EntityGraph::new();
        let user = graph.create_entity(EntityKind::User, "u").id;
        let resource = graph.create_resource("/x", "doc", None).unwrap().id;
        graph.set_permission(Permission::grant(user, resource, Verb::Get, "https")).unwrap();

        let err = graph.delete_entity(user, false).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::DependenciesExist);
        assert!(graph.entity_exists(user));
    }

    #[test]
    fn deleting_group_with_members_is_rejected_without_force() {
        let mut graph = EntityGraph::new();
        let group = graph.create_entity(EntityKind::Group, "g").id;
        let user = graph.create_entity(EntityKind::User, "u").id;
        graph.add_membership(user, group).unwrap();

        let err = graph.delete_entity(group, false).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::DependenciesExist);
        assert!(graph.entity_exists(group));

        graph.delete_entity(group, true).unwrap();
        assert!(!graph.entity_exists(group));
        assert!(graph.direct_parents(user).is_empty());
    }

    #[test]
    fn deleting_resource_with_child_resource_is_rejected_without_force() {
        let mut graph = EntityGraph::new();
        let parent = graph.create_resource("/docs", "collection", None).unwrap().id;
        graph.create_resource("/docs/1", "document", Some(parent)).unwrap();

        let err = graph.delete_resource(parent, false).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::DependenciesExist);
        assert!(graph.get_resource(parent).is_ok());

        graph.delete_resource(parent, true).unwrap();
        assert!(graph.get_resource(parent).is_err());
    }

    #[test]
    fn deleting_resource_with_permissions_is_rejected_without_force() {
        let mut graph = EntityGraph::new();
        let user = graph.create_entity(EntityKind::User, "u").id;
        let resource = graph.create_resource("/x", "doc", None).unwrap().id;
        graph.set_permission(Permission::grant(user, resource, Verb::Get, "https")).unwrap();

        let err = graph.delete_resource(resource, false).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::DependenciesExist);

        graph.delete_resource(resource, true).unwrap();
        assert!(graph.get_resource(resource).is_err());
        assert!(graph.permissions_for_entity(user).is_empty());
    }

    #[test]
    fn rejects_malformed_uri_pattern() {
        let mut graph = EntityGraph::new();
        assert!(graph.create_resource("/docs/{id", "document", None).is_err());
        assert!(graph.create_resource("/docs/*/more", "document", None).is_err());
    }
}
