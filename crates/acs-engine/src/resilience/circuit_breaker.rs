// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Per-operation circuit breaker.
//!
//! Tracks the outcome of the last `window` calls in a fixed-size ring
//! buffer. Once the window is full, an error rate at or above `threshold`
//! opens the circuit for `open_duration`; a call attempted while open is
//! rejected without running. After `open_duration` elapses the breaker
//! moves to half-open and allows exactly one trial call through — success
//! closes the circuit, failure reopens it.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    samples: std::collections::VecDeque<bool>,
    opened_at: Option<Instant>,
}

pub struct CircuitBreaker {
    window: usize,
    error_rate_threshold: f64,
    open_duration: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(window: usize, error_rate_threshold: f64, open_duration: Duration) -> Self {
        Self {
            window,
            error_rate_threshold,
            open_duration,
            inner: Mutex::new(Inner { state: CircuitState::Closed, samples: std::collections::VecDeque::with_capacity(window), opened_at: None }),
        }
    }

    /// Whether a call may proceed right now. Transitions Open -> HalfOpen
    /// when `open_duration` has elapsed.
    pub fn allow(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => true,
            CircuitState::Open => {
                if inner.opened_at.map(|at| at.elapsed() >= self.open_duration).unwrap_or(false) {
                    inner.state = CircuitState::HalfOpen;
                    tracing::warn!("circuit breaker half-open, allowing one trial call");
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().unwrap().state
    }

    /// Record the outcome of a call that [`CircuitBreaker::allow`] permitted.
    pub fn record(&self, success: bool) {
        let mut inner = self.inner.lock().unwrap();

        if inner.state == CircuitState::HalfOpen {
            if success {
                inner.state = CircuitState::Closed;
                inner.samples.clear();
                inner.opened_at = None;
                tracing::info!("circuit breaker closed after successful trial call");
            } else {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                tracing::warn!("circuit breaker reopened after failed trial call");
            }
            return;
        }

        if inner.samples.len() == self.window {
            inner.samples.pop_front();
        }
        inner.samples.push_back(success);

        if inner.samples.len() == self.window {
            let errors = inner.samples.iter().filter(|ok| !**ok).count();
            let error_rate = errors as f64 / self.window as f64;
            if error_rate >= self.error_rate_threshold {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                tracing::warn!(error_rate, threshold = self.error_rate_threshold, "circuit breaker opened");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_error_rate_exceeds_threshold() {
        let breaker = CircuitBreaker::new(10, 0.25, Duration::from_millis(50));
        for _ in 0..7 {
            assert!(breaker.allow());
            breaker.record(true);
        }
        for _ in 0..3 {
            assert!(breaker.allow());
            breaker.record(false);
        }
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.allow());
    }

    #[test]
    fn half_open_success_closes_circuit() {
        let breaker = CircuitBreaker::new(4, 0.25, Duration::from_millis(10));
        for _ in 0..3 {
            breaker.allow();
            breaker.record(false);
        }
        breaker.allow();
        breaker.record(false);
        assert_eq!(breaker.state(), CircuitState::Open);

        std::thread::sleep(Duration::from_millis(20));
        assert!(breaker.allow());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        breaker.record(true);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
