// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup into
//! [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APP_ENV` | `development` or `production` | `development` |
//! | `DATA_DIR` | Directory holding `wallet.redb` | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HS256 signing secret | Required in production |
//! | `TOKEN_TTL_MINUTES` | Session token lifetime | `60` |
//! | `LOCK_TIMEOUT_MS` | Max wait for a contended balance row | `2000` |
//! | `CONFLICT_RETRIES` | Attempts per purchase/transfer on conflict | `3` |
//! | `PASSWORD_ROUNDS` | PBKDF2 iterations for new hashes | `100000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::auth::password::DEFAULT_ROUNDS;
use crate::logging::LogFormat;
use crate::wallet::WalletConfig;

pub const APP_ENV_ENV: &str = "APP_ENV";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_MINUTES";
pub const LOCK_TIMEOUT_ENV: &str = "LOCK_TIMEOUT_MS";
pub const CONFLICT_RETRIES_ENV: &str = "CONFLICT_RETRIES";
pub const PASSWORD_ROUNDS_ENV: &str = "PASSWORD_ROUNDS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Signing secret used when `APP_ENV=development` and none is set.
const DEV_JWT_SECRET: &str = "dev-only-insecure-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required outside development")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub wallet: WalletConfig,
    pub password_rounds: u32,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match lookup(APP_ENV_ENV).as_deref() {
            None | Some("development") | Some("dev") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: APP_ENV_ENV,
                    value: other.to_string(),
                })
            }
        };

        let jwt_secret = match (lookup(JWT_SECRET_ENV), environment) {
            (Some(secret), _) if !secret.is_empty() => secret,
            (_, Environment::Development) => DEV_JWT_SECRET.to_string(),
            (_, Environment::Production) => return Err(ConfigError::Missing(JWT_SECRET_ENV)),
        };

        let host = lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(&lookup, PORT_ENV, 8080)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                value: host,
            })?;

        let ttl_minutes: i64 = parse_or(&lookup, TOKEN_TTL_ENV, 60)?;
        let token_ttl = chrono::Duration::try_minutes(ttl_minutes)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .ok_or_else(|| ConfigError::Invalid {
                name: TOKEN_TTL_ENV,
                value: ttl_minutes.to_string(),
            })?;
        let lock_timeout_ms: u64 = parse_or(&lookup, LOCK_TIMEOUT_ENV, 2000)?;
        let retries: u32 = parse_or(&lookup, CONFLICT_RETRIES_ENV, 3)?;

        Ok(Self {
            environment,
            data_dir: lookup(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            bind_addr,
            jwt_secret,
            token_ttl,
            wallet: WalletConfig {
                lock_timeout: Duration::from_millis(lock_timeout_ms),
                retry_attempts: retries,
            },
            password_rounds: parse_or(&lookup, PASSWORD_ROUNDS_ENV, DEFAULT_ROUNDS)?,
            log_format: LogFormat::from_str_lossy(
                lookup(LOG_FORMAT_ENV).as_deref().unwrap_or("pretty"),
            ),
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_in_development() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.wallet.lock_timeout, Duration::from_millis(2000));
        assert_eq!(cfg.wallet.retry_attempts, 3);
        assert_eq!(cfg.token_ttl, chrono::Duration::minutes(60));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.uses_dev_secret());
    }

    #[test]
    fn production_requires_secret() {
        let err = config(&[("APP_ENV", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let cfg = config(&[("APP_ENV", "production"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.jwt_secret, "s3cret");
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("PORT", "9000"),
            ("LOCK_TIMEOUT_MS", "150"),
            ("CONFLICT_RETRIES", "5"),
            ("LOG_FORMAT", "JSON"),
            ("DATA_DIR", "/var/lib/wallet"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.wallet.lock_timeout, Duration::from_millis(150));
        assert_eq!(cfg.wallet.retry_attempts, 5);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/wallet"));
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
