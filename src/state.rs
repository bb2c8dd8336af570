// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthService, PasswordHasher, TokenIssuer};
use crate::config::AppConfig;
use crate::storage::{StoreResult, UserDirectory, WalletDatabase, DEFAULT_CATALOG};
use crate::wallet::{WalletConfig, WalletService};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<WalletDatabase>,
    pub wallet: WalletService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(db: Arc<WalletDatabase>, wallet_config: WalletConfig, auth: AuthService) -> Self {
        Self {
            wallet: WalletService::new(Arc::clone(&db), wallet_config),
            db,
            auth,
        }
    }

    /// Open the database under `config.data_dir`, seed the catalog and wire
    /// every service.
    pub fn from_config(config: &AppConfig) -> StoreResult<Self> {
        let db = Arc::new(WalletDatabase::open_in(&config.data_dir)?);
        db.seed_catalog(DEFAULT_CATALOG)?;

        let auth = AuthService::new(
            UserDirectory::new(Arc::clone(&db)),
            PasswordHasher::new(config.password_rounds),
            TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl),
        );
        Ok(Self::new(db, config.wallet, auth))
    }
}

/// Fresh state on a temporary database with the default catalog.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(WalletDatabase::open_in(dir.path()).unwrap());
    db.seed_catalog(DEFAULT_CATALOG).unwrap();
    let auth = AuthService::new(
        UserDirectory::new(Arc::clone(&db)),
        PasswordHasher::new(10),
        TokenIssuer::new(b"test-secret", chrono::Duration::minutes(5)),
    );
    (AppState::new(db, WalletConfig::default(), auth), dir)
}
