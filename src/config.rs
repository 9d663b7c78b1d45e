// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CUSTODIAN_BASE_URL` | Custodian REST API base URL | Required |
//! | `CUSTODIAN_API_KEY` | Custodian API key (JWT `sub`, `X-API-Key`) | Required |
//! | `CUSTODIAN_SECRET_KEY_PATH` | Path to the RSA private key PEM | Required unless PEM is inline |
//! | `CUSTODIAN_SECRET_KEY_PEM` | Inline RSA private key PEM (`\n` escapes allowed) | Optional |
//! | `DATABASE_PATH` | redb wallet database file | `data/wallets.redb` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS when both are set | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fs, net::SocketAddr, path::PathBuf};

use url::Url;

pub const CUSTODIAN_BASE_URL_ENV: &str = "CUSTODIAN_BASE_URL";
pub const CUSTODIAN_API_KEY_ENV: &str = "CUSTODIAN_API_KEY";
pub const CUSTODIAN_SECRET_KEY_PATH_ENV: &str = "CUSTODIAN_SECRET_KEY_PATH";
pub const CUSTODIAN_SECRET_KEY_PEM_ENV: &str = "CUSTODIAN_SECRET_KEY_PEM";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATABASE_PATH: &str = "data/wallets.redb";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub custodian_base_url: String,
    pub custodian_api_key: String,
    /// RSA private key PEM used to sign custodian requests.
    pub custodian_secret_key_pem: String,
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let custodian_base_url = required(CUSTODIAN_BASE_URL_ENV)?;
        Url::parse(&custodian_base_url).map_err(|e| ConfigError::Invalid {
            name: CUSTODIAN_BASE_URL_ENV,
            reason: e.to_string(),
        })?;

        let custodian_api_key = required(CUSTODIAN_API_KEY_ENV)?;

        let custodian_secret_key_pem = match var(CUSTODIAN_SECRET_KEY_PEM_ENV) {
            Some(pem) => pem.replace("\\n", "\n"),
            None => read_pem(&required(CUSTODIAN_SECRET_KEY_PATH_ENV)?)?,
        };

        let database_path: PathBuf = var(DATABASE_PATH_ENV)
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
            .into();

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })?;

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = match var(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            custodian_base_url,
            custodian_api_key,
            custodian_secret_key_pem,
            database_path,
            bind_addr,
            tls,
            log_format,
        })
    }
}

fn read_pem(path: &str) -> Result<String, ConfigError> {
    let pem = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    let trimmed = pem.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid {
            name: CUSTODIAN_SECRET_KEY_PATH_ENV,
            reason: format!("{path} is empty"),
        });
    }
    Ok(trimmed.to_string())
}
