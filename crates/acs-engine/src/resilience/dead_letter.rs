// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Dead-letter queue for commands whose retries were exhausted.
//!
//! Entries are held in memory for operator inspection and manual replay;
//! nothing here automatically retries a dead-lettered command, since doing
//! so could reorder it relative to commands submitted after it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetter {
    pub command_description: String,
    pub submitted_by: String,
    pub failure_reason: String,
    pub failed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Default)]
pub struct DeadLetterQueue {
    entries: RwLock<Vec<DeadLetter>>,
}

impl DeadLetterQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command_description: impl Into<String>, submitted_by: impl Into<String>, failure_reason: impl Into<String>) {
        self.entries.write().push(DeadLetter {
            command_description: command_description.into(),
            submitted_by: submitted_by.into(),
            failure_reason: failure_reason.into(),
            failed_at: chrono::Utc::now(),
        });
    }

    pub fn drain(&self) -> Vec<DeadLetter> {
        std::mem::take(&mut *self.entries.write())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain_round_trips() {
        let queue = DeadLetterQueue::new();
        queue.push("CreateEntity(alice)", "svc-account", "repository unavailable");
        assert_eq!(queue.len(), 1);
        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert!(queue.is_empty());
    }
}
