// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-wide row locks keyed by user id.
//!
//! redb serializes write transactions globally but a scope reads a balance
//! long before it commits. The row lock keeps that read authoritative: while
//! a scope holds user `u`, no other scope can read-for-update or write `u`.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::database::{StoreError, StoreResult};
use super::records::UserId;

/// Held row lock. Released on drop.
pub type RowGuard = OwnedMutexGuard<()>;

/// Shared table of per-user async mutexes.
#[derive(Clone, Default)]
pub struct RowLocks {
    rows: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
}

impl RowLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait up to `timeout` for the lock on `user`.
    pub async fn acquire(&self, user: UserId, timeout: Duration) -> StoreResult<RowGuard> {
        // Clone the Arc out so the shard lock is not held across the await
        let mutex = self.rows.entry(user).or_default().clone();
        match tokio::time::timeout(timeout, mutex.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                tracing::warn!(user_id = %user, ?timeout, "Row lock wait timed out");
                Err(StoreError::LockTimeout(user))
            }
        }
    }

    /// Drop the entry for `user` if nobody holds or waits on it.
    pub fn prune(&self, user: UserId) {
        self.rows
            .remove_if(&user, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    /// Number of tracked rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
