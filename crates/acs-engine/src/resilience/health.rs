// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Health monitoring: aggregates circuit breaker state and dead-letter
//! queue depth into a single status a load balancer or operator dashboard
//! can poll.

use serde::{Deserialize, Serialize};

use super::circuit_breaker::CircuitState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Unknown,
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub command_buffer_depth: usize,
    pub command_buffer_capacity: usize,
    pub dead_letter_count: usize,
    pub repository_circuit: CircuitSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitSummary {
    pub open: bool,
    pub half_open: bool,
}

impl From<CircuitState> for CircuitSummary {
    fn from(state: CircuitState) -> Self {
        Self { open: state == CircuitState::Open, half_open: state == CircuitState::HalfOpen }
    }
}

/// Derive a [`HealthStatus`] from the component signals.
///
/// * `Unknown` — fewer than `sample_floor` commands have been processed
///   since startup; there isn't enough history yet to call the service
///   healthy or not.
/// * `Critical` — the repository circuit is open (writes cannot durably
///   succeed) or the command buffer is effectively full.
/// * `Warning` — the circuit is half-open (recovering), the buffer is more
///   than 75% full, or the dead-letter queue is non-empty.
/// * `Healthy` — none of the above.
pub fn assess(
    command_buffer_depth: usize,
    command_buffer_capacity: usize,
    dead_letter_count: usize,
    circuit: CircuitState,
    samples_processed: u64,
    sample_floor: u64,
) -> HealthReport {
    let fill_ratio = if command_buffer_capacity == 0 { 0.0 } else { command_buffer_depth as f64 / command_buffer_capacity as f64 };

    let status = if samples_processed < sample_floor {
        HealthStatus::Unknown
    } else if circuit == CircuitState::Open || fill_ratio >= 0.95 {
        HealthStatus::Critical
    } else if circuit == CircuitState::HalfOpen || fill_ratio >= 0.75 || dead_letter_count > 0 {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    };

    HealthReport {
        status,
        command_buffer_depth,
        command_buffer_capacity,
        dead_letter_count,
        repository_circuit: circuit.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_circuit_is_critical() {
        let report = assess(0, 100, 0, CircuitState::Open, 10, 10);
        assert_eq!(report.status, HealthStatus::Critical);
    }

    #[test]
    fn near_full_buffer_is_critical() {
        let report = assess(96, 100, 0, CircuitState::Closed, 10, 10);
        assert_eq!(report.status, HealthStatus::Critical);
    }

    #[test]
    fn dead_letters_are_a_warning() {
        let report = assess(0, 100, 1, CircuitState::Closed, 10, 10);
        assert_eq!(report.status, HealthStatus::Warning);
    }

    #[test]
    fn empty_everything_is_healthy() {
        let report = assess(0, 100, 0, CircuitState::Closed, 10, 10);
        assert_eq!(report.status, HealthStatus::Healthy);
    }

    #[test]
    fn below_sample_floor_is_unknown_regardless_of_other_signals() {
        let report = assess(96, 100, 5, CircuitState::Open, 3, 10);
        assert_eq!(report.status, HealthStatus::Unknown);
    }

    #[test]
    fn reaching_the_sample_floor_reveals_the_real_status() {
        let report = assess(0, 100, 0, CircuitState::Closed, 10, 10);
        assert_eq!(report.status, HealthStatus::Healthy);
    }
}
