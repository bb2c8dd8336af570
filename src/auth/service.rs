// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and first-login provisioning.

use crate::storage::{StoreError, UserDirectory, UserRecord};

use super::{AuthError, AuthenticatedUser, PasswordHasher, TokenIssuer};

#[derive(Clone)]
pub struct AuthService {
    users: UserDirectory,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: UserDirectory, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Exchange credentials for a session token.
    ///
    /// An unseen login creates the user with the starting balance. A known
    /// login must present the password it was created with.
    pub fn login(&self, login: &str, password: &str) -> Result<String, AuthError> {
        if login.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = match self.users.find_by_login(login)? {
            Some(existing) => self.check_password(existing, password)?,
            None => self.provision(login, password)?,
        };

        tracing::debug!(user_id = %user.id, "Token issued");
        self.tokens.issue(&user)
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.tokens.verify(token)
    }

    fn provision(&self, login: &str, password: &str) -> Result<UserRecord, AuthError> {
        let hash = self.hasher.hash(password);
        match self.users.create(login, &hash) {
            Ok(user) => Ok(user),
            // Lost a race with a concurrent first login for the same key
            Err(StoreError::DuplicateLogin(_)) => {
                let existing = self.users.find_by_login(login)?.ok_or_else(|| {
                    AuthError::InternalError(format!("login '{login}' vanished after conflict"))
                })?;
                self.check_password(existing, password)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn check_password(&self, user: UserRecord, password: &str) -> Result<UserRecord, AuthError> {
        if self.hasher.verify(password, &user.password_hash)? {
            Ok(user)
        } else {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            Err(AuthError::InvalidPassword)
        }
    }
}
