// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Permission evaluation cache.
//!
//! [`PermissionCache`] memoises [`EvaluationOutcome`]s keyed by
//! `(entity_id, uri, verb)`. Coherence (I5) is maintained by a per-entity
//! generation counter: every cached entry is stamped with the generation of
//! its entity at insertion time, and a lookup discards (and counts as a
//! miss) any entry whose stamp is stale. The single-writer command buffer
//! bumps the relevant generations — directly for touched entities, or the
//! whole tenant for bulk-invalidating mutations — strictly before it makes
//! the underlying mutation visible to new readers, so a reader can never
//! observe a cached decision that predates a mutation it could otherwise see.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use parking_lot::RwLock;

use crate::types::{CacheKey, CacheStats, EntityId, EvaluationOutcome};

struct Entry {
    outcome: EvaluationOutcome,
    generation: u64,
}

/// A TTL- and generation-bounded cache of permission evaluation outcomes for
/// one tenant.
pub struct PermissionCache {
    entries: Cache<CacheKey, Arc<Entry>>,
    generations: RwLock<std::collections::HashMap<EntityId, u64>>,
    tenant_generation: AtomicU64,
    lookups: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl PermissionCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).time_to_live(ttl).build(),
            generations: RwLock::new(std::collections::HashMap::new()),
            tenant_generation: AtomicU64::new(0),
            lookups: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn current_generation(&self, entity_id: EntityId) -> u64 {
        let tenant_gen = self.tenant_generation.load(Ordering::Acquire);
        let entity_gen = self.generations.read().get(&entity_id).copied().unwrap_or(0);
        tenant_gen.max(entity_gen)
    }

    /// Look up a memoised outcome, discarding it if it predates the
    /// entity's current generation.
    pub fn get(&self, key: &CacheKey) -> Option<EvaluationOutcome> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let current = self.current_generation(key.entity_id);
        match self.entries.get(key) {
            Some(entry) if entry.generation >= current => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.outcome.clone())
            }
            Some(_) => {
                self.entries.invalidate(key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, key: CacheKey, outcome: EvaluationOutcome) {
        let generation = self.current_generation(key.entity_id);
        self.entries.insert(key, Arc::new(Entry { outcome, generation }));
    }

    /// Bump the generation for a single entity, invalidating any cached
    /// decision keyed on it regardless of TTL.
    pub fn invalidate_entity(&self, entity_id: EntityId) {
        let mut generations = self.generations.write();
        let next = generations.get(&entity_id).copied().unwrap_or(0) + 1;
        generations.insert(entity_id, next);
    }

    /// Bump the tenant-wide generation, invalidating every cached decision.
    /// Used for mutations whose blast radius cannot be enumerated cheaply
    /// (e.g. adding a group to another group affects an unbounded subtree).
    pub fn invalidate_all(&self) {
        self.tenant_generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Verb;

    fn allowed() -> EvaluationOutcome {
        EvaluationOutcome::Allowed { reason: "test".into(), inherited_from: None, inheritance_chain: vec![] }
    }

    #[test]
    fn hit_after_put() {
        let cache = PermissionCache::new(1000, Duration::from_secs(60));
        let key = CacheKey { entity_id: 1, uri: "/x".into(), verb: Verb::Get };
        cache.put(key.clone(), allowed());
        assert_eq!(cache.get(&key), Some(allowed()));
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn invalidate_entity_evicts_stale_entry() {
        let cache = PermissionCache::new(1000, Duration::from_secs(60));
        let key = CacheKey { entity_id: 1, uri: "/x".into(), verb: Verb::Get };
        cache.put(key.clone(), allowed());
        cache.invalidate_entity(1);
        assert_eq!(cache.get(&key), None);
    }

    #[test]
    fn invalidate_all_evicts_every_entity() {
        let cache = PermissionCache::new(1000, Duration::from_secs(60));
        let key_a = CacheKey { entity_id: 1, uri: "/x".into(), verb: Verb::Get };
        let key_b = CacheKey { entity_id: 2, uri: "/y".into(), verb: Verb::Get };
        cache.put(key_a.clone(), allowed());
        cache.put(key_b.clone(), allowed());
        cache.invalidate_all();
        assert_eq!(cache.get(&key_a), None);
        assert_eq!(cache.get(&key_b), None);
    }

    #[test]
    fn put_after_invalidation_is_valid_again() {
        let cache = PermissionCache::new(1000, Duration::from_secs(60));
        let key = CacheKey { entity_id: 1, uri: "/x".into(), verb: Verb::Get };
        cache.invalidate_entity(1);
        cache.put(key.clone(), allowed());
        assert_eq!(cache.get(&key), Some(allowed()));
    }
}
