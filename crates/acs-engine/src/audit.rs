// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Audit trail management.
//!
//! [`AuditTrail`] appends [`AuditRecord`]s chained via SHA-256 so the log is
//! tamper-evident (I4): each record's `hash` covers its own fields plus the
//! previous record's hash, so altering or removing a record breaks every
//! hash computed after it. The trail is append-managed in memory (the
//! current chain tip) but every append is persisted to the repository in
//! the same call that persists the domain mutation it describes, via
//! `acs_repository::Repository::persist`.

use std::sync::Mutex;

use acs_core::error::Result;
use acs_core::types::{AuditFilter, AuditId, AuditStats, ExportFormat, IntegrityReport};
use acs_core::AuditRecord;
use sha2::{Digest, Sha256};

/// Builds the next [`AuditRecord`] in the chain and tracks the running tip
/// hash so repeated calls link correctly without re-reading the store.
pub struct AuditTrail {
    next_id: Mutex<AuditId>,
    tip_hash: Mutex<String>,
}

impl AuditTrail {
    /// Resume a trail whose most recent persisted record is `tail`, or start
    /// a fresh genesis chain if `tail` is `None`.
    pub fn resume(tail: Option<&AuditRecord>) -> Self {
        match tail {
            Some(record) => Self { next_id: Mutex::new(record.id + 1), tip_hash: Mutex::new(record.hash.clone()) },
            None => Self { next_id: Mutex::new(1), tip_hash: Mutex::new("0".repeat(64)) },
        }
    }

    /// Build the next record in the chain. Does not persist it — the caller
    /// (the command buffer's writer task) persists it alongside the domain
    /// mutation it describes so the two never diverge.
    pub fn next_record(
        &self,
        change_type: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: Option<acs_core::types::EntityId>,
        changed_by: impl Into<String>,
        change_details: serde_json::Value,
    ) -> AuditRecord {
        let mut next_id = self.next_id.lock().unwrap();
        let mut tip = self.tip_hash.lock().unwrap();

        let id = *next_id;
        let timestamp = chrono::Utc::now();
        let change_type = change_type.into();
        let entity_type = entity_type.into();
        let changed_by = changed_by.into();
        let prev_hash = tip.clone();

        let hash = compute_hash(id, timestamp, &change_type, &entity_type, entity_id, &changed_by, &change_details, &prev_hash);

        *next_id += 1;
        *tip = hash.clone();

        AuditRecord { id, timestamp, change_type, entity_type, entity_id, changed_by, change_details, prev_hash, hash }
    }

    pub fn chain_tip(&self) -> String {
        self.tip_hash.lock().unwrap().clone()
    }
}

/// SHA-256 over the canonical field concatenation described by I4:
/// `id || timestamp || change_type || entity_type || entity_id ||
/// changed_by || details || prev_hash`.
fn compute_hash(
    id: AuditId,
    timestamp: chrono::DateTime<chrono::Utc>,
    change_type: &str,
    entity_type: &str,
    entity_id: Option<acs_core::types::EntityId>,
    changed_by: &str,
    change_details: &serde_json::Value,
    prev_hash: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.to_le_bytes());
    hasher.update(timestamp.to_rfc3339().as_bytes());
    hasher.update(change_type.as_bytes());
    hasher.update(entity_type.as_bytes());
    hasher.update(entity_id.unwrap_or(0).to_le_bytes());
    hasher.update(changed_by.as_bytes());
    hasher.update(change_details.to_string().as_bytes());
    hasher.update(prev_hash.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recompute `record`'s hash from its own fields and compare against the
/// stored value, independent of chain position.
pub fn record_hash_is_valid(record: &AuditRecord) -> bool {
    let recomputed = compute_hash(
        record.id,
        record.timestamp,
        &record.change_type,
        &record.entity_type,
        record.entity_id,
        &record.changed_by,
        &record.change_details,
        &record.prev_hash,
    );
    recomputed == record.hash
}

/// Validate chain integrity over `records`, which MUST already be sorted by
/// id ascending.
///
/// Checks, per I4's failure modes:
/// * `HashChainBroken` — a record's own hash does not match its fields, or
///   does not match the next record's `prev_hash`.
/// * `MissingId` — a gap in the id sequence.
/// * `MalformedDetails` — `change_details` is not a JSON object.
/// * `DuplicateHash` — the same hash appears on more than one record.
pub fn validate_integrity(records: &[AuditRecord]) -> IntegrityReport {
    let mut report = IntegrityReport { records_checked: records.len(), ..Default::default() };
    let mut seen_hashes = std::collections::HashMap::new();

    for (index, record) in records.iter().enumerate() {
        if !record_hash_is_valid(record) {
            report.hash_chain_broken_at.push(record.id);
        }
        if index > 0 {
            let previous = &records[index - 1];
            if record.id != previous.id + 1 {
                report.missing_ids.push((previous.id, record.id));
            }
            if record.prev_hash != previous.hash {
                report.hash_chain_broken_at.push(record.id);
            }
        }
        if !record.change_details.is_object() {
            report.malformed_details_at.push(record.id);
        }
        if let Some(existing) = seen_hashes.insert(record.hash.clone(), record.id) {
            report.duplicate_hashes_at.push(record.id);
            report.duplicate_hashes_at.push(existing);
        }
    }

    report.hash_chain_broken_at.sort_unstable();
    report.hash_chain_broken_at.dedup();
    report.duplicate_hashes_at.sort_unstable();
    report.duplicate_hashes_at.dedup();
    report
}

/// Aggregate statistics over `records`.
pub fn compute_stats(records: &[AuditRecord]) -> AuditStats {
    let mut users = std::collections::HashSet::new();
    let mut entities = std::collections::HashSet::new();
    let mut security_events = 0;
    let mut data_events = 0;

    for record in records {
        users.insert(record.changed_by.clone());
        if let Some(id) = record.entity_id {
            entities.insert(id);
        }
        if record.change_type.starts_with("SECURITY:") {
            security_events += 1;
        }
        if record.change_type.starts_with("PERMISSION:") || record.change_type.starts_with("ENTITY:") {
            data_events += 1;
        }
    }

    AuditStats {
        total_records: records.len(),
        unique_users: users.len(),
        unique_entities: entities.len(),
        security_events,
        data_events,
    }
}

/// Subjects with an unusual volume of access denials within a short window:
/// any user with at least `deny_threshold` `ACCESS_DENIED` records whose
/// timestamps fall inside a single `window`-wide span is flagged.
pub fn detect_suspicious_activity(records: &[AuditRecord], deny_threshold: usize, window: chrono::Duration) -> Vec<String> {
    let mut denies_by_subject: std::collections::HashMap<acs_core::types::EntityId, Vec<chrono::DateTime<chrono::Utc>>> =
        std::collections::HashMap::new();
    for record in records {
        if record.change_type == "ACCESS_DENIED" {
            if let Some(entity_id) = record.entity_id {
                denies_by_subject.entry(entity_id).or_default().push(record.timestamp);
            }
        }
    }

    let mut flagged = Vec::new();
    for (subject, mut timestamps) in denies_by_subject {
        timestamps.sort();
        for window_start in &timestamps {
            let count = timestamps.iter().filter(|t| **t >= *window_start && **t <= *window_start + window).count();
            if count >= deny_threshold {
                flagged.push(subject.to_string());
                break;
            }
        }
    }
    flagged
}

/// Render `records` in the requested [`ExportFormat`].
pub fn export(records: &[AuditRecord], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => {
            Ok(serde_json::to_string_pretty(records).map_err(|e| acs_core::error::AcsError::integrity_violation(e.to_string()))?)
        }
        ExportFormat::Csv => {
            let mut out = String::from("id,timestamp,change_type,entity_type,entity_id,changed_by,prev_hash,hash\n");
            for record in records {
                out.push_str(&format!(
                    "{},{},{},{},{},{},{},{}\n",
                    record.id,
                    record.timestamp.to_rfc3339(),
                    record.change_type,
                    record.entity_type,
                    record.entity_id.map(|i| i.to_string()).unwrap_or_default(),
                    record.changed_by,
                    record.prev_hash,
                    record.hash,
                ));
            }
            Ok(out)
        }
    }
}

/// Apply the filter used by [`acs_repository::Repository::query_audit`]'s
/// in-memory counterpart, over `filter`, preserving a minimum age for
/// retention purge: a record is purge-eligible when older than
/// `cutoff` and its `change_type` does not start with any of
/// `preserved_prefixes`.
pub fn purge_eligible<'a>(records: &'a [AuditRecord], cutoff: chrono::DateTime<chrono::Utc>, preserved_prefixes: &[String]) -> Vec<&'a AuditRecord> {
    records
        .iter()
        .filter(|r| r.timestamp < cutoff)
        .filter(|r| !preserved_prefixes.iter().any(|prefix| r.change_type.starts_with(prefix.as_str())))
        .collect()
}

pub fn matches_filter(record: &AuditRecord, filter: &AuditFilter) -> bool {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_record_chains_from_genesis() {
        let trail = AuditTrail::resume(None);
        let record = trail.next_record("ENTITY:CREATE", "User", Some(1), "tester", serde_json::json!({}));
        assert_eq!(record.prev_hash.len(), 64);
        assert_eq!(record.prev_hash, "0".repeat(64));
        assert!(record_hash_is_valid(&record));
    }

    #[test]
    fn chain_links_successive_records() {
        let trail = AuditTrail::resume(None);
        let first = trail.next_record("ENTITY:CREATE", "User", Some(1), "tester", serde_json::json!({}));
        let second = trail.next_record("ENTITY:RENAME", "User", Some(1), "tester", serde_json::json!({}));
        assert_eq!(second.prev_hash, first.hash);
    }

    #[test]
    fn tampering_with_a_field_breaks_validation() {
        let trail = AuditTrail::resume(None);
        let mut record = trail.next_record("ENTITY:CREATE", "User", Some(1), "tester", serde_json::json!({}));
        record.changed_by = "attacker".to_string();
        assert!(!record_hash_is_valid(&record));
    }

    #[test]
    fn integrity_report_flags_missing_id_and_broken_link() {
        let trail = AuditTrail::resume(None);
        let first = trail.next_record("ENTITY:CREATE", "User", Some(1), "tester", serde_json::json!({}));
        let mut third = trail.next_record("ENTITY:RENAME", "User", Some(1), "tester", serde_json::json!({}));
        third.id = 3;

        let report = validate_integrity(&[first, third]);
        assert!(!report.is_clean());
        assert!(!report.missing_ids.is_empty());
    }

    #[test]
    fn purge_eligible_respects_preserved_prefixes() {
        let trail = AuditTrail::resume(None);
        let old = trail.next_record("SECURITY:LOGIN_FAILED", "User", Some(1), "tester", serde_json::json!({}));
        let cutoff = chrono::Utc::now() + chrono::Duration::seconds(1);
        let records = [old];
        let eligible = purge_eligible(&records, cutoff, &["SECURITY:".to_string()]);
        assert!(eligible.is_empty());
    }
}
