// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Salted password hashing.
//!
//! PBKDF2 with HMAC-SHA256, one 32-byte output block. Stored as
//! `pbkdf2-sha256$<rounds>$<salt>$<hash>` with standard base64 fields, so the
//! round count can be raised later without invalidating existing hashes.

use base64ct::{Base64, Encoding};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::AuthError;

const SCHEME: &str = "pbkdf2-sha256";
const OUTPUT_LEN: usize = 32;

pub const DEFAULT_ROUNDS: u32 = 100_000;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    rounds: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS)
    }
}

impl PasswordHasher {
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds: rounds.max(1),
        }
    }

    pub fn hash(&self, password: &str) -> String {
        let salt = uuid::Uuid::new_v4();
        let derived = derive(password.as_bytes(), salt.as_bytes(), self.rounds);
        format!(
            "{SCHEME}${}${}${}",
            self.rounds,
            Base64::encode_string(salt.as_bytes()),
            Base64::encode_string(&derived)
        )
    }

    /// Check `password` against a stored hash. The round count comes from
    /// the stored value, not from `self`.
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let malformed = || AuthError::InternalError("stored password hash is malformed".into());

        let mut fields = stored.split('$');
        if fields.next() != Some(SCHEME) {
            return Err(malformed());
        }
        let rounds: u32 = fields
            .next()
            .and_then(|r| r.parse().ok())
            .ok_or_else(malformed)?;
        let salt = fields
            .next()
            .and_then(|s| Base64::decode_vec(s).ok())
            .ok_or_else(malformed)?;
        let expected = fields
            .next()
            .and_then(|h| Base64::decode_vec(h).ok())
            .ok_or_else(malformed)?;
        if fields.next().is_some() {
            return Err(malformed());
        }

        let derived = derive(password.as_bytes(), &salt, rounds);
        // Length mismatch compares unequal
        Ok(derived[..].ct_eq(&expected[..]).into())
    }
}

fn derive(password: &[u8], salt: &[u8], rounds: u32) -> [u8; OUTPUT_LEN] {
    let mut out = [0u8; OUTPUT_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new(1_000);
        let stored = hasher.hash("hunter2");
        assert!(stored.starts_with("pbkdf2-sha256$1000$"));
        assert!(hasher.verify("hunter2", &stored).unwrap());
        assert!(!hasher.verify("hunter3", &stored).unwrap());
    }

    #[test]
    fn salts_differ_per_hash() {
        let hasher = PasswordHasher::new(10);
        assert_ne!(hasher.hash("same"), hasher.hash("same"));
    }

    #[test]
    fn verify_uses_stored_round_count() {
        let stored = PasswordHasher::new(50).hash("pw");
        assert!(PasswordHasher::new(9_999).verify("pw", &stored).unwrap());
    }

    #[test]
    fn rfc_6070_style_vector() {
        // PBKDF2-HMAC-SHA256, P = "password", S = "salt", c = 1
        let out = derive(b"password", b"salt", 1);
        assert_eq!(
            out[..4],
            [0x12, 0x0f, 0xb6, 0xcf],
            "first bytes of the published test vector"
        );
    }

    #[test]
    fn truncated_stored_hash_never_matches() {
        let hasher = PasswordHasher::new(10);
        let stored = hasher.hash("pw");
        let (head, hash) = stored.rsplit_once('$').unwrap();
        let mut short = Base64::decode_vec(hash).unwrap();
        short.truncate(16);
        let truncated = format!("{head}${}", Base64::encode_string(&short));
        assert!(!hasher.verify("pw", &truncated).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let hasher = PasswordHasher::default();
        for stored in ["", "plain", "pbkdf2-sha256$x$AA==$AA==", "bcrypt$1$AA==$AA=="] {
            assert!(hasher.verify("pw", stored).is_err(), "{stored}");
        }
    }
}
