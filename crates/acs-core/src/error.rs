// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Crate-wide error type.
//!
//! [`AcsError`] carries a stable [`ErrorKind`] that callers can match on
//! (e.g. to map to an HTTP status code) plus a human-readable message for
//! logs and audit details.

use thiserror::Error;

/// Stable classification of an [`AcsError`], independent of its message.
///
/// Kept small and closed so that every call site in `acs-engine`/`acs-api`
/// can exhaustively map it onto transport-level semantics (HTTP status,
/// retry eligibility) without inspecting the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request referenced an entity, resource, or audit record id that
    /// does not exist.
    NotFound,
    /// The request conflicts with concurrent state (e.g. a duplicate
    /// permission key that arrived mid-flight).
    Conflict,
    /// The request is structurally malformed (bad URI pattern, grant/deny
    /// both set, self-membership).
    InvalidArgument,
    /// Adding a membership edge would create a cycle in the group DAG (I2).
    CycleDetected,
    /// The target of a delete still has dependents that block a non-cascading
    /// removal.
    DependenciesExist,
    /// The command buffer is saturated and cannot accept more work.
    Backpressure,
    /// A command's deadline elapsed before the writer task dequeued it.
    Timeout,
    /// The audit hash chain failed validation.
    IntegrityViolation,
    /// The repository failed to durably persist a mutation or audit record.
    PersistenceFailure,
    /// A resilience circuit breaker is open for the attempted operation.
    CircuitOpen,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::CycleDetected => "cycle_detected",
            ErrorKind::DependenciesExist => "dependencies_exist",
            ErrorKind::Backpressure => "backpressure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::IntegrityViolation => "integrity_violation",
            ErrorKind::PersistenceFailure => "persistence_failure",
            ErrorKind::CircuitOpen => "circuit_open",
        }
    }

    /// Whether a caller may reasonably retry an operation that failed with
    /// this kind (used by `acs-engine::resilience::retry`). Precondition
    /// errors (bad input, cycles, missing dependencies) never become true on
    /// retry without the caller changing something, so they are excluded.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::PersistenceFailure | ErrorKind::CircuitOpen)
    }
}

/// The crate-wide error type returned by `acs-core` operations.
///
/// `details` carries structured context (the offending id, the cycle path,
/// …) alongside `message`, matching the `{kind, message, details?}` wire
/// shape `acs-api` serializes back to callers.
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct AcsError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl AcsError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn cycle_detected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CycleDetected, message)
    }

    pub fn dependencies_exist(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DependenciesExist, message)
    }

    pub fn backpressure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Backpressure, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn integrity_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IntegrityViolation, message)
    }

    pub fn persistence_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PersistenceFailure, message)
    }

    pub fn circuit_open(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CircuitOpen, message)
    }
}

pub type Result<T> = std::result::Result<T, AcsError>;
