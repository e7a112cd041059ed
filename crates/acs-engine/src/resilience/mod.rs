// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Resilience primitives wrapping repository calls: a per-operation circuit
//! breaker, retry with backoff, a dead-letter queue for exhausted retries,
//! and health aggregation over all three.

pub mod circuit_breaker;
pub mod dead_letter;
pub mod health;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use dead_letter::{DeadLetter, DeadLetterQueue};
pub use health::{HealthReport, HealthStatus};
pub use retry::retry;
