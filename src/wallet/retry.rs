// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bounded retry of a unit of work on storage conflicts.

use std::future::Future;
use std::time::Duration;

use super::error::WalletResult;

/// Default number of attempts (first try included).
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Pause between attempts, multiplied by the attempt number.
const BACKOFF_STEP: Duration = Duration::from_millis(20);

/// Retry policy for conflicting units of work.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// `attempts` is clamped to at least one.
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts are exhausted. Each call of `op` must open its own scope.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> WalletResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = WalletResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(e) if e.is_retryable() && attempt < self.attempts => {
                    tracing::warn!(operation, attempt, error = %e, "Retrying after storage conflict");
                    tokio::time::sleep(BACKOFF_STEP * attempt).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::storage::UserId;
    use crate::wallet::error::WalletError;

    #[tokio::test]
    async fn retries_conflicts_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = RetryPolicy::new(3)
            .run("test", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(WalletError::StorageConflict("busy".to_string()))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: WalletResult<()> = RetryPolicy::new(2)
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(WalletError::StorageConflict("busy".to_string()))
            })
            .await;
        assert!(matches!(result, Err(WalletError::StorageConflict(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_errors_are_returned_immediately() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: WalletResult<()> = RetryPolicy::default()
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(WalletError::UserNotFound(UserId(1)))
            })
            .await;
        assert!(matches!(result, Err(WalletError::UserNotFound(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: WalletResult<()> = RetryPolicy::new(0)
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(WalletError::StorageConflict("busy".to_string()))
            })
            .await;
        assert!(matches!(result, Err(WalletError::StorageConflict(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
