// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! The single-writer command buffer.
//!
//! [`CommandBuffer::submit`] enqueues a [`Command`] and waits for the writer
//! task to apply it. The writer task is the only place that ever takes the
//! entity graph's write lock, so commands are applied in the exact order
//! they were enqueued (FIFO) and a caller that has received a reply has a
//! read-your-writes guarantee: every later `submit`, and every concurrent
//! read through [`crate::engine::AcsEngine`]'s shared read lock, observes
//! the mutation.
//!
//! The channel is bounded by `command_queue_capacity`; a full channel fails
//! fast with `ErrorKind::Backpressure` rather than blocking the submitter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use acs_core::cache::PermissionCache;
use acs_core::error::{AcsError, Result};
use acs_core::graph::EntityGraph;
use acs_core::types::AuditFilter;
use acs_repository::Repository;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::audit::AuditTrail;
use crate::command::{Command, CommandOutcome};
use crate::handlers;
use crate::resilience::{retry, CircuitBreaker, DeadLetterQueue};

struct Envelope {
    command: Command,
    reply: oneshot::Sender<Result<CommandOutcome>>,
}

/// Handle used by callers to submit commands. Cloning shares the same
/// underlying channel and writer task.
#[derive(Clone)]
pub struct CommandBuffer {
    sender: mpsc::Sender<Envelope>,
    capacity: usize,
    processed: Arc<AtomicU64>,
}

/// Everything the writer task needs, grouped so [`CommandBuffer::spawn`]
/// doesn't take an unwieldy parameter list.
pub struct WriterContext {
    pub graph: Arc<RwLock<EntityGraph>>,
    pub cache: Arc<PermissionCache>,
    pub audit: Arc<AuditTrail>,
    pub repository: Arc<dyn Repository>,
    pub circuit: Arc<CircuitBreaker>,
    pub dead_letters: Arc<DeadLetterQueue>,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub audit_retention_days: u32,
    pub preserved_change_type_prefixes: Vec<String>,
}

impl CommandBuffer {
    /// Spawn the writer task and return the handle callers submit through.
    pub fn spawn(capacity: usize, ctx: WriterContext) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        let processed = Arc::new(AtomicU64::new(0));
        tokio::spawn(run_writer(receiver, ctx, processed.clone()));
        Self { sender, capacity, processed }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Commands currently enqueued but not yet applied by the writer task.
    pub fn depth(&self) -> usize {
        self.capacity.saturating_sub(self.sender.capacity())
    }

    /// Total commands the writer task has finished applying (successfully
    /// or not) since this buffer was spawned.
    pub fn processed_count(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Enqueue `command` and wait for it to be applied.
    ///
    /// Fails fast with `ErrorKind::Backpressure` if the queue is full, and
    /// with `ErrorKind::PersistenceFailure` if the writer task has
    /// terminated (which only happens if it panicked).
    pub async fn submit(&self, command: Command) -> Result<CommandOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .try_send(Envelope { command, reply: reply_tx })
            .map_err(|_| AcsError::backpressure("command buffer is full"))?;
        reply_rx.await.map_err(|_| AcsError::persistence_failure("writer task terminated without replying"))?
    }
}

async fn run_writer(mut receiver: mpsc::Receiver<Envelope>, ctx: WriterContext, processed: Arc<AtomicU64>) {
    while let Some(envelope) = receiver.recv().await {
        let description = envelope.command.description();
        let submitted_by = envelope.command.requested_by().to_string();

        let outcome = if matches!(envelope.command, Command::PurgeAudit { .. }) {
            apply_purge(&ctx).await
        } else {
            apply_mutation(&ctx, envelope.command).await
        };

        if let Err(ref error) = outcome {
            tracing::warn!(command = %description, error = %error, "command failed");
            if error.kind == acs_core::error::ErrorKind::PersistenceFailure {
                ctx.dead_letters.push(description, submitted_by, error.message.clone());
            }
        }

        processed.fetch_add(1, Ordering::Relaxed);
        let _ = envelope.reply.send(outcome);
    }
}

#[tracing::instrument(skip(ctx, command), fields(command = %command.description()))]
async fn apply_mutation(ctx: &WriterContext, command: Command) -> Result<CommandOutcome> {
    let (change, record, effect, outcome) = {
        let mut graph = ctx.graph.write().await;
        let result = handlers::apply(&mut graph, &ctx.audit, command)?;
        if result.2.bulk_invalidate {
            ctx.cache.invalidate_all();
        } else {
            for entity_id in &result.2.touched_entities {
                ctx.cache.invalidate_entity(*entity_id);
            }
        }
        result
    };

    persist_with_resilience(ctx, &change, &record).await?;
    let _ = effect;
    Ok(outcome)
}

async fn apply_purge(ctx: &WriterContext) -> Result<CommandOutcome> {
    let default_filter = AuditFilter::default();
    let records = retry(ctx.max_retries, ctx.retry_base_delay, || ctx.repository.query_audit(&default_filter)).await?;

    let cutoff = chrono::Utc::now() - chrono::Duration::days(ctx.audit_retention_days as i64);
    let eligible: Vec<_> = crate::audit::purge_eligible(&records, cutoff, &ctx.preserved_change_type_prefixes)
        .into_iter()
        .map(|r| r.id)
        .collect();
    let deleted_count = eligible.len();

    let purge_record = ctx.audit.next_record(
        "SYSTEM:PURGE",
        "AuditLog",
        None,
        "system:retention",
        serde_json::json!({ "deleted_count": deleted_count, "cutoff": cutoff.to_rfc3339() }),
    );

    retry(ctx.max_retries, ctx.retry_base_delay, || ctx.repository.purge_audit(&eligible, &purge_record)).await?;

    Ok(CommandOutcome::Purged(acs_core::types::PurgeReport { deleted_count, purge_record_id: purge_record.id }))
}

/// Persist `change`/`record` with circuit-breaker short-circuiting and
/// retry-with-backoff on top.
///
/// The mutation is already visible in-memory by the time this runs (the
/// graph lock in [`apply_mutation`] has already been released), trading
/// strict write-ahead durability for availability: a reader can observe a
/// command's effect slightly before it is durable. A repository outage
/// surfaces as a `PersistenceFailure` error to the submitter and a
/// dead-letter entry, not a rollback of the in-memory mutation.
async fn persist_with_resilience(ctx: &WriterContext, change: &acs_repository::Change, record: &acs_core::AuditRecord) -> Result<()> {
    if !ctx.circuit.allow() {
        return Err(AcsError::circuit_open("repository circuit is open"));
    }

    let result = retry(ctx.max_retries, ctx.retry_base_delay, || ctx.repository.persist(change, record)).await;
    ctx.circuit.record(result.is_ok());
    result
}
