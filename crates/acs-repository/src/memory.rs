// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! A volatile, heap-allocated [`Repository`] implementation.
//!
//! All data lives in process memory and is lost when the repository is
//! dropped. Suitable for integration testing and for running `acs-server`
//! without a Postgres instance during local development.

use std::collections::HashMap;

use acs_core::error::Result;
use acs_core::types::{AuditFilter, AuditId};
use acs_core::AuditRecord;
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::change::{Change, Snapshot};
use crate::Repository;

#[derive(Debug, Default)]
struct State {
    snapshot: Snapshot,
    audit: Vec<AuditRecord>,
}

/// An in-memory [`Repository`] backed by a single [`parking_lot::RwLock`].
///
/// # Examples
///
/// ```rust
/// use acs_repository::{InMemoryRepository, Repository};
///
/// #[tokio::main]
/// async fn main() {
///     let repo = InMemoryRepository::new();
///     let snapshot = repo.load_snapshot().await.unwrap();
///     assert!(snapshot.entities.is_empty());
/// }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_change(state: &mut State, change: &Change) {
        match change {
            Change::UpsertEntity(entity) => {
                state.snapshot.entities.retain(|e| e.id != entity.id);
                state.snapshot.entities.push(entity.clone());
            }
            Change::DeleteEntity(id) => {
                state.snapshot.entities.retain(|e| e.id != *id);
                state.snapshot.memberships.retain(|(c, p)| c != id && p != id);
                state.snapshot.permissions.retain(|p| p.entity_id != *id);
            }
            Change::UpsertResource(resource) => {
                state.snapshot.resources.retain(|r| r.id != resource.id);
                state.snapshot.resources.push(resource.clone());
            }
            Change::DeleteResource(id) => {
                state.snapshot.resources.retain(|r| r.id != *id);
                state.snapshot.permissions.retain(|p| p.resource_id != *id);
            }
            Change::AddMembership { child, parent } => {
                if !state.snapshot.memberships.contains(&(*child, *parent)) {
                    state.snapshot.memberships.push((*child, *parent));
                }
            }
            Change::RemoveMembership { child, parent } => {
                state.snapshot.memberships.retain(|(c, p)| !(c == child && p == parent));
            }
            Change::SetPermission(permission) => {
                state.snapshot.permissions.retain(|p| p.key() != permission.key());
                state.snapshot.permissions.push(permission.clone());
            }
            Change::RevokePermission { entity_id, resource_id, verb, scheme } => {
                state
                    .snapshot
                    .permissions
                    .retain(|p| !(p.entity_id == *entity_id && p.resource_id == *resource_id && p.verb == *verb && &p.scheme == scheme));
            }
            Change::AuditOnly => {}
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn persist(&self, change: &Change, audit: &AuditRecord) -> Result<()> {
        let mut state = self.state.write();
        Self::apply_change(&mut state, change);
        state.audit.push(audit.clone());
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Snapshot> {
        Ok(self.state.read().snapshot.clone())
    }

    async fn load_audit_tail(&self) -> Result<Option<AuditRecord>> {
        Ok(self.state.read().audit.last().cloned())
    }

    async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>> {
        let state = self.state.read();
        let mut matched: Vec<AuditRecord> = state
            .audit
            .iter()
            .filter(|record| {
                if let Some(entity_id) = filter.entity_id {
                    if record.entity_id != Some(entity_id) {
                        return false;
                    }
                }
                if let Some(ref changed_by) = filter.changed_by {
                    if &record.changed_by != changed_by {
                        return false;
                    }
                }
                if let Some(ref prefix) = filter.change_type_prefix {
                    if !record.change_type.starts_with(prefix.as_str()) {
                        return false;
                    }
                }
                if let Some(since) = filter.since {
                    if record.timestamp < since {
                        return false;
                    }
                }
                if let Some(until) = filter.until {
                    if record.timestamp > until {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        if let Some(offset) = filter.offset {
            matched = matched.into_iter().skip(offset).collect();
        }
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn purge_audit(&self, deleted_ids: &[AuditId], purge_record: &AuditRecord) -> Result<()> {
        let mut state = self.state.write();
        let deleted: HashMap<AuditId, ()> = deleted_ids.iter().map(|id| (*id, ())).collect();
        state.audit.retain(|r| !deleted.contains_key(&r.id));
        state.audit.push(purge_record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs_core::types::{Entity, EntityKind};
    use chrono::Utc;

    fn sample_audit(id: AuditId, entity_id: i64) -> AuditRecord {
        AuditRecord {
            id,
            timestamp: Utc::now(),
            change_type: "ENTITY:CREATE".into(),
            entity_type: "User".into(),
            entity_id: Some(entity_id),
            changed_by: "tester".into(),
            change_details: serde_json::json!({}),
            prev_hash: "0".repeat(64),
            hash: format!("{id:064}"),
        }
    }

    #[tokio::test]
    async fn persisted_entity_appears_in_snapshot() {
        let repo = InMemoryRepository::new();
        let entity =
            Entity { id: 1, kind: EntityKind::User, name: "alice".into(), created_at: Utc::now(), updated_at: Utc::now(), deleted: false };
        repo.persist(&Change::UpsertEntity(entity.clone()), &sample_audit(1, 1)).await.unwrap();

        let snapshot = repo.load_snapshot().await.unwrap();
        assert_eq!(snapshot.entities.len(), 1);
        assert_eq!(snapshot.entities[0].id, 1);
    }

    #[tokio::test]
    async fn purge_removes_only_targeted_records() {
        let repo = InMemoryRepository::new();
        let entity =
            Entity { id: 1, kind: EntityKind::User, name: "alice".into(), created_at: Utc::now(), updated_at: Utc::now(), deleted: false };
        repo.persist(&Change::UpsertEntity(entity), &sample_audit(1, 1)).await.unwrap();
        repo.persist(&Change::DeleteEntity(1), &sample_audit(2, 1)).await.unwrap();

        repo.purge_audit(&[1], &sample_audit(3, 1)).await.unwrap();

        let remaining = repo.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(remaining.iter().filter(|r| r.id == 1).count(), 0);
        assert_eq!(remaining.iter().filter(|r| r.id == 2).count(), 1);
        assert_eq!(remaining.iter().filter(|r| r.id == 3).count(), 1);
    }
}
