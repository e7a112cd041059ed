// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Exponential backoff with jitter for retrying transient repository
//! failures (`ErrorKind::PersistenceFailure`/`ErrorKind::CircuitOpen`, see
//! `acs_core::error::ErrorKind::is_retryable`).

use std::future::Future;
use std::time::Duration;

use acs_core::error::{AcsError, Result};
use rand::Rng;

/// Retry `operation` up to `max_retries` additional times when it returns a
/// retryable error, sleeping `base_delay * 2^attempt` plus up to 20% jitter
/// between attempts.
pub async fn retry<F, Fut, T>(max_retries: u32, base_delay: Duration, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.kind.is_retryable() && attempt < max_retries => {
                let delay = backoff_with_jitter(base_delay, attempt);
                tracing::warn!(attempt, ?delay, error = %error, "retrying after transient failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

fn backoff_with_jitter(base_delay: Duration, attempt: u32) -> Duration {
    let exponential = base_delay.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX));
    let jitter_fraction: f64 = rand::thread_rng().gen_range(0.0..0.2);
    exponential + Duration::from_secs_f64(exponential.as_secs_f64() * jitter_fraction)
}

/// Map an exhausted retry budget into an `AcsError` suitable for returning
/// to the caller, when the caller wants to distinguish "gave up" from the
/// underlying error kind.
pub fn retries_exhausted(last_error: AcsError) -> AcsError {
    AcsError::persistence_failure(format!("retries exhausted: {last_error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs_core::error::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let attempts = AtomicU32::new(0);
        let result = retry(3, Duration::from_millis(1), || {
            let attempts = &attempts;
            async move {
                let count = attempts.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(AcsError::persistence_failure("transient"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let attempts = AtomicU32::new(0);
        let result: Result<()> = retry(3, Duration::from_millis(1), || {
            let attempts = &attempts;
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(AcsError::invalid_argument("permanent"))
            }
        })
        .await;
        assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidArgument);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
