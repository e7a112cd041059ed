// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! # acs-repository
//!
//! Persistence gateway for the Access Control Service.
//!
//! [`Repository`] is the single interface between `acs-engine`'s command
//! buffer and any backing store. Every applied command is persisted through
//! one call to [`Repository::persist`], which writes the domain mutation and
//! its audit record together so a crash can never leave one without the
//! other. This crate ships two implementations:
//!
//! * [`memory::InMemoryRepository`] — volatile, for tests and local
//!   development.
//! * [`postgres::PostgresRepository`] — durable, backed by a Postgres
//!   connection pool via `sqlx`.

pub mod change;
pub mod memory;
pub mod postgres;

use acs_core::error::Result;
use acs_core::types::AuditFilter;
use acs_core::AuditRecord;
use async_trait::async_trait;

pub use change::{Change, Snapshot};
pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Persistence gateway for one tenant's entity graph and audit trail.
///
/// Implementations MUST be `Send + Sync` so a single `Arc<dyn Repository>`
/// can be shared between the command buffer's writer task and any
/// background readers (e.g. the HTTP audit export endpoint).
#[async_trait]
pub trait Repository: Send + Sync {
    /// Persist `change` and its accompanying `audit` record as a single
    /// atomic unit.
    async fn persist(&self, change: &Change, audit: &AuditRecord) -> Result<()>;

    /// Load the full current graph, used once at startup to rebuild
    /// `acs-engine`'s in-memory `EntityGraph`.
    async fn load_snapshot(&self) -> Result<Snapshot>;

    /// The most recently persisted audit record, if any, used to seed the
    /// hash chain's `prev_hash` on startup.
    async fn load_audit_tail(&self) -> Result<Option<AuditRecord>>;

    /// Audit records matching `filter`, ordered by id ascending.
    async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>>;

    /// Persist a purge: physically remove every audit record with id in
    /// `deleted_ids` and append `purge_record` documenting the purge.
    async fn purge_audit(&self, deleted_ids: &[acs_core::types::AuditId], purge_record: &AuditRecord) -> Result<()>;
}
