// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Username/password login and HS256 session tokens.
//!
//! ## Auth Flow
//!
//! 1. Client posts `{username, password}` to `/api/auth`
//! 2. Server:
//!    - provisions the user on first login (starting balance 1000)
//!    - otherwise checks the password against the stored PBKDF2 hash
//!    - returns a signed JWT (`sub` = numeric user id)
//! 3. Client sends `Authorization: Bearer <jwt>` on every other call
//!
//! ## Security
//!
//! - All non-health endpoints except login require authentication
//! - Passwords are salted per user and compared in constant time
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod service;
pub mod token;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::Auth;
pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::TokenIssuer;
