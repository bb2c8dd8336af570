// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User directory: provisioning and identity lookups.

use std::sync::Arc;

use chrono::Utc;
use redb::{ReadableTable, TableDefinition};

use super::balances;
use super::database::{next_sequence, Snapshot, StoreError, StoreResult, WalletDatabase};
use super::records::{UserId, UserRecord, STARTING_BALANCE};

/// Users: user id → serialized UserRecord (JSON bytes).
pub(crate) const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Login index: login → user id.
pub(crate) const USER_LOGINS: TableDefinition<&str, u64> = TableDefinition::new("user_logins");

const USER_SEQUENCE: &str = "user_id";

#[derive(Clone)]
pub struct UserDirectory {
    db: Arc<WalletDatabase>,
}

impl UserDirectory {
    pub fn new(db: Arc<WalletDatabase>) -> Self {
        Self { db }
    }

    /// Create a user with the starting balance.
    ///
    /// User row, login index and opening balance are written in one
    /// transaction, so a user is never visible without a balance.
    pub fn create(&self, login: &str, password_hash: &str) -> StoreResult<UserRecord> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut logins = write_txn.open_table(USER_LOGINS)?;
            if logins.get(login)?.is_some() {
                return Err(StoreError::DuplicateLogin(login.to_string()));
            }

            let id = UserId(next_sequence(&write_txn, USER_SEQUENCE)?);
            let record = UserRecord {
                id,
                login: login.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            };

            let json = serde_json::to_vec(&record)?;
            let mut users = write_txn.open_table(USERS)?;
            users.insert(id.0, json.as_slice())?;
            logins.insert(login, id.0)?;
            record
        };
        balances::insert_opening(&write_txn, record.id, STARTING_BALANCE)?;
        write_txn.commit()?;

        tracing::info!(user_id = %record.id, login = %record.login, "User provisioned");
        Ok(record)
    }

    pub fn find_by_login(&self, login: &str) -> StoreResult<Option<UserRecord>> {
        let snapshot = self.db.snapshot()?;
        match id_by_login_in(&snapshot, login)? {
            Some(id) => get_in(&snapshot, id),
            None => Ok(None),
        }
    }

    pub fn id_by_login(&self, login: &str) -> StoreResult<Option<UserId>> {
        id_by_login_in(&self.db.snapshot()?, login)
    }

    pub fn get(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        get_in(&self.db.snapshot()?, id)
    }
}

pub(crate) fn id_by_login_in(snapshot: &Snapshot, login: &str) -> StoreResult<Option<UserId>> {
    let table = snapshot.txn().open_table(USER_LOGINS)?;
    Ok(table.get(login)?.map(|v| UserId(v.value())))
}

pub(crate) fn get_in(snapshot: &Snapshot, id: UserId) -> StoreResult<Option<UserRecord>> {
    let table = snapshot.txn().open_table(USERS)?;
    match table.get(id.0)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}
