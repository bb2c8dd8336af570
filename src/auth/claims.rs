// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::storage::UserId;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric user id, as a string
    pub sub: String,
    pub login: String,
    pub iat: i64,
    pub exp: i64,
}

/// The caller of an authenticated request.
///
/// Handlers pass `user_id` to the wallet core unchanged; the core trusts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub login: String,
    /// Unix timestamp
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Result<Self, AuthError> {
        let id: u64 = claims.sub.parse().map_err(|_| AuthError::MalformedToken)?;
        Ok(Self {
            user_id: UserId(id),
            login: claims.login,
            expires_at: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            login: "alice".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        }
    }

    #[test]
    fn from_claims_parses_numeric_subject() {
        let user = AuthenticatedUser::from_claims(sample_claims("42")).unwrap();
        assert_eq!(user.user_id, UserId(42));
        assert_eq!(user.login, "alice");
        assert_eq!(user.expires_at, 1_700_003_600);
    }

    #[test]
    fn from_claims_rejects_non_numeric_subject() {
        let err = AuthenticatedUser::from_claims(sample_claims("user_123")).unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken));
    }
}
