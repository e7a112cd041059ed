// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! [`AcsEngine`] — the top-level composition of the entity graph, cache,
//! audit trail, repository, resilience layer, and command buffer into a
//! single evaluation and mutation API.
//!
//! # Examples
//!
//! ```rust,no_run
//! use acs_core::config::AcsConfig;
//! use acs_core::types::{EntityKind, Verb};
//! use acs_engine::AcsEngine;
//! use acs_repository::InMemoryRepository;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = AcsEngine::new(AcsConfig::default(), Arc::new(InMemoryRepository::new())).await.unwrap();
//!     let user = engine.create_entity(EntityKind::User, "alice", "admin").await.unwrap();
//!     let resource = engine.create_resource("/documents/*", "document", None, "admin").await.unwrap();
//!     engine.grant(user.id, resource.id, Verb::Get, "https", "admin").await.unwrap();
//!     let outcome = engine.evaluate(user.id, "/documents/42", Verb::Get, "https").await.unwrap();
//!     assert!(outcome.is_allowed());
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use acs_core::cache::PermissionCache;
use acs_core::config::AcsConfig;
use acs_core::error::Result;
use acs_core::evaluator::PermissionEvaluator;
use acs_core::graph::EntityGraph;
use acs_core::types::{
    AuditFilter, AuditStats, CacheKey, CacheStats, Entity, EntityId, EntityKind, EvaluationOutcome, ExportFormat, IntegrityReport, Permission,
    PurgeReport, Resource, ResourceId, Verb,
};
use acs_core::AuditRecord;
use acs_repository::Repository;
use tokio::sync::RwLock;

use crate::audit::{self, AuditTrail};
use crate::buffer::{CommandBuffer, WriterContext};
use crate::command::{Command, CommandOutcome};
use crate::resilience::{CircuitBreaker, DeadLetterQueue, HealthReport};

/// Composes every ACS component behind a single API.
///
/// Mutations (`create_entity`, `set_permission`, ...) go through the
/// single-writer [`CommandBuffer`]; read-only operations (`evaluate`,
/// `list_entities`, `query_audit`) take the graph's shared read lock
/// directly and never touch the command channel, so reads never queue
/// behind writes.
pub struct AcsEngine {
    graph: Arc<RwLock<EntityGraph>>,
    cache: Arc<PermissionCache>,
    audit: Arc<AuditTrail>,
    repository: Arc<dyn Repository>,
    dead_letters: Arc<DeadLetterQueue>,
    circuit: Arc<CircuitBreaker>,
    buffer: CommandBuffer,
    max_retries: u32,
    retry_base_delay: Duration,
    health_sample_floor: u64,
}

impl AcsEngine {
    /// Build an [`AcsEngine`] backed by `repository`, restoring its graph
    /// from the repository's snapshot and resuming its audit hash chain
    /// from the repository's last persisted record.
    pub async fn new(config: AcsConfig, repository: Arc<dyn Repository>) -> Result<Self> {
        let snapshot = repository.load_snapshot().await?;
        let mut graph = EntityGraph::new();
        for entity in snapshot.entities {
            graph.restore_entity(entity);
        }
        for resource in snapshot.resources {
            graph.restore_resource(resource);
        }
        for (child, parent) in snapshot.memberships {
            let _ = graph.add_membership(child, parent);
        }
        for permission in snapshot.permissions {
            let _ = graph.set_permission(permission);
        }

        let tail = repository.load_audit_tail().await?;
        let audit = Arc::new(AuditTrail::resume(tail.as_ref()));
        let cache = Arc::new(PermissionCache::new(config.cache_capacity, Duration::from_secs(config.cache_ttl_secs)));
        let circuit = Arc::new(CircuitBreaker::new(
            config.circuit_breaker_window,
            config.circuit_breaker_error_rate,
            Duration::from_millis(config.circuit_breaker_open_ms),
        ));
        let dead_letters = Arc::new(DeadLetterQueue::new());
        let graph = Arc::new(RwLock::new(graph));
        let retry_base_delay = Duration::from_millis(config.retry_base_delay_ms);

        let buffer = CommandBuffer::spawn(
            config.command_queue_capacity,
            WriterContext {
                graph: graph.clone(),
                cache: cache.clone(),
                audit: audit.clone(),
                repository: repository.clone(),
                circuit: circuit.clone(),
                dead_letters: dead_letters.clone(),
                max_retries: config.max_retries,
                retry_base_delay,
                audit_retention_days: config.audit_retention_days,
                preserved_change_type_prefixes: config.preserved_change_type_prefixes.clone(),
            },
        );

        Ok(Self {
            graph,
            cache,
            audit,
            repository,
            dead_letters,
            circuit,
            buffer,
            max_retries: config.max_retries,
            retry_base_delay,
            health_sample_floor: config.health_sample_floor,
        })
    }

    // -----------------------------------------------------------------
    // Evaluation (read path — bypasses the command buffer entirely)
    // -----------------------------------------------------------------

    /// Evaluate whether `entity_id` may perform `verb` against `uri` under
    /// `scheme`, consulting the cache before falling back to
    /// [`PermissionEvaluator::evaluate`].
    ///
    /// A freshly computed `Denied` outcome is also appended to the audit
    /// trail as an `ACCESS_DENIED` record (cache hits are not re-recorded),
    /// so [`AcsEngine::detect_suspicious_activity`] has something to count.
    pub async fn evaluate(&self, entity_id: EntityId, uri: &str, verb: Verb, scheme: &str) -> Result<EvaluationOutcome> {
        let key = CacheKey { entity_id, uri: uri.to_string(), verb };
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        let outcome = {
            let graph = self.graph.read().await;
            PermissionEvaluator::evaluate(&graph, entity_id, uri, verb, scheme)?
        };
        self.cache.put(key, outcome.clone());

        if let EvaluationOutcome::Denied { ref reason, .. } = outcome {
            let record = self.audit.next_record(
                "ACCESS_DENIED",
                "Permission",
                Some(entity_id),
                entity_id.to_string(),
                serde_json::json!({ "uri": uri, "verb": verb, "scheme": scheme, "reason": reason }),
            );
            if let Err(error) = self.repository.persist(&acs_repository::Change::AuditOnly, &record).await {
                tracing::warn!(%error, entity_id, uri, "failed to persist ACCESS_DENIED audit record");
            }
        }

        Ok(outcome)
    }

    pub async fn get_entity(&self, id: EntityId) -> Result<Entity> {
        Ok(self.graph.read().await.get_entity(id)?.clone())
    }

    pub async fn list_entities(&self, kind: Option<EntityKind>) -> Vec<Entity> {
        self.graph.read().await.list_entities(kind).into_iter().cloned().collect()
    }

    pub async fn get_resource(&self, id: ResourceId) -> Result<Resource> {
        Ok(self.graph.read().await.get_resource(id)?.clone())
    }

    pub async fn list_resources(&self) -> Vec<Resource> {
        self.graph.read().await.all_resources().cloned().collect()
    }

    pub async fn direct_permissions(&self, entity_id: EntityId, resource_id: ResourceId) -> Vec<Permission> {
        self.graph.read().await.direct_permissions(entity_id, resource_id).into_iter().cloned().collect()
    }

    pub async fn ancestors(&self, entity_id: EntityId) -> Vec<EntityId> {
        self.graph.read().await.ancestors(entity_id)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn health(&self) -> HealthReport {
        crate::resilience::health::assess(
            self.buffer.depth(),
            self.buffer.capacity(),
            self.dead_letters.len(),
            self.circuit.state(),
            self.buffer.processed_count(),
            self.health_sample_floor,
        )
    }

    // -----------------------------------------------------------------
    // Mutations (go through the single-writer command buffer)
    // -----------------------------------------------------------------

    pub async fn create_entity(&self, kind: EntityKind, name: impl Into<String>, requested_by: impl Into<String>) -> Result<Entity> {
        match self.buffer.submit(Command::CreateEntity { kind, name: name.into(), requested_by: requested_by.into() }).await? {
            CommandOutcome::Entity(entity) => Ok(entity),
            _ => unreachable!("CreateEntity always returns CommandOutcome::Entity"),
        }
    }

    pub async fn rename_entity(&self, id: EntityId, name: impl Into<String>, requested_by: impl Into<String>) -> Result<Entity> {
        match self.buffer.submit(Command::RenameEntity { id, name: name.into(), requested_by: requested_by.into() }).await? {
            CommandOutcome::Entity(entity) => Ok(entity),
            _ => unreachable!("RenameEntity always returns CommandOutcome::Entity"),
        }
    }

    /// Delete `id`. Rejected with `ErrorKind::DependenciesExist` if it still
    /// has children or owned permissions, unless `force` is set.
    pub async fn delete_entity(&self, id: EntityId, force: bool, requested_by: impl Into<String>) -> Result<()> {
        self.buffer.submit(Command::DeleteEntity { id, force, requested_by: requested_by.into() }).await.map(|_| ())
    }

    pub async fn create_resource(
        &self,
        uri_pattern: impl Into<String>,
        resource_type: impl Into<String>,
        parent_resource_id: Option<ResourceId>,
        requested_by: impl Into<String>,
    ) -> Result<Resource> {
        match self
            .buffer
            .submit(Command::CreateResource {
                uri_pattern: uri_pattern.into(),
                resource_type: resource_type.into(),
                parent_resource_id,
                requested_by: requested_by.into(),
            })
            .await?
        {
            CommandOutcome::Resource(resource) => Ok(resource),
            _ => unreachable!("CreateResource always returns CommandOutcome::Resource"),
        }
    }

    /// Delete `id`. Rejected with `ErrorKind::DependenciesExist` if it still
    /// has child resources or referencing permissions, unless `force` is set.
    pub async fn delete_resource(&self, id: ResourceId, force: bool, requested_by: impl Into<String>) -> Result<()> {
        self.buffer.submit(Command::DeleteResource { id, force, requested_by: requested_by.into() }).await.map(|_| ())
    }

    pub async fn add_membership(&self, child: EntityId, parent: EntityId, requested_by: impl Into<String>) -> Result<()> {
        self.buffer.submit(Command::AddMembership { child, parent, requested_by: requested_by.into() }).await.map(|_| ())
    }

    pub async fn remove_membership(&self, child: EntityId, parent: EntityId, requested_by: impl Into<String>) -> Result<()> {
        self.buffer.submit(Command::RemoveMembership { child, parent, requested_by: requested_by.into() }).await.map(|_| ())
    }

    pub async fn set_permission(&self, permission: Permission, requested_by: impl Into<String>) -> Result<()> {
        self.buffer.submit(Command::SetPermission { permission, requested_by: requested_by.into() }).await.map(|_| ())
    }

    /// Convenience wrapper over [`AcsEngine::set_permission`] for the common
    /// grant case.
    pub async fn grant(&self, entity_id: EntityId, resource_id: ResourceId, verb: Verb, scheme: impl Into<String>, requested_by: impl Into<String>) -> Result<()> {
        self.set_permission(Permission::grant(entity_id, resource_id, verb, scheme), requested_by).await
    }

    /// Convenience wrapper over [`AcsEngine::set_permission`] for the common
    /// deny case.
    pub async fn deny(&self, entity_id: EntityId, resource_id: ResourceId, verb: Verb, scheme: impl Into<String>, requested_by: impl Into<String>) -> Result<()> {
        self.set_permission(Permission::deny(entity_id, resource_id, verb, scheme), requested_by).await
    }

    pub async fn revoke_permission(
        &self,
        entity_id: EntityId,
        resource_id: ResourceId,
        verb: Verb,
        scheme: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Result<()> {
        self.buffer
            .submit(Command::RevokePermission { entity_id, resource_id, verb, scheme: scheme.into(), requested_by: requested_by.into() })
            .await
            .map(|_| ())
    }

    /// Purge audit records older than `audit_retention_days` whose
    /// `change_type` does not match a preserved prefix. Routed through the
    /// command buffer so it serialises against concurrent mutations that
    /// also append audit records.
    pub async fn purge_audit(&self, requested_by: impl Into<String>) -> Result<PurgeReport> {
        match self.buffer.submit(Command::PurgeAudit { requested_by: requested_by.into() }).await? {
            CommandOutcome::Purged(report) => Ok(report),
            _ => unreachable!("PurgeAudit always returns CommandOutcome::Purged"),
        }
    }

    // -----------------------------------------------------------------
    // Audit queries (read path, with retry against the repository)
    // -----------------------------------------------------------------

    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>> {
        crate::resilience::retry(self.max_retries, self.retry_base_delay, || self.repository.query_audit(filter)).await
    }

    pub async fn audit_stats(&self) -> Result<AuditStats> {
        let records = self.query_audit(&AuditFilter::default()).await?;
        Ok(audit::compute_stats(&records))
    }

    pub async fn validate_audit_integrity(&self) -> Result<IntegrityReport> {
        let records = self.query_audit(&AuditFilter::default()).await?;
        let report = audit::validate_integrity(&records);
        if !report.is_clean() {
            tracing::error!(
                hash_chain_broken_at = ?report.hash_chain_broken_at,
                missing_ids = ?report.missing_ids,
                duplicate_hashes_at = ?report.duplicate_hashes_at,
                "audit log integrity violation detected"
            );
        }
        Ok(report)
    }

    pub async fn detect_suspicious_activity(&self, deny_threshold: usize, window: chrono::Duration) -> Result<Vec<String>> {
        let records = self.query_audit(&AuditFilter::default()).await?;
        Ok(audit::detect_suspicious_activity(&records, deny_threshold, window))
    }

    pub async fn export_audit(&self, filter: &AuditFilter, format: ExportFormat) -> Result<String> {
        let records = self.query_audit(filter).await?;
        audit::export(&records, format)
    }

    pub fn chain_tip(&self) -> String {
        self.audit.chain_tip()
    }
}
