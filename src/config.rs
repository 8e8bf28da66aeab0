// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `DATA_DIR` | Directory holding the certification database | `./data` |
//! | `MESSAGEBOX_HOST` | Relay host anointed and recorded on certification | `https://messagebox.babbage.systems` |
//! | `WALLET_API_URL` | Wallet JSON API | `http://localhost:3321` |
//! | `RELAY_BRIDGE_URL` | Message-box client bridge | `http://localhost:3322` |
//! | `SESSION_TIMEOUT_SECS` | Wallet session idle timeout | `1800` |
//! | `SESSION_SWEEP_INTERVAL_SECS` | Expired session sweep period | `300` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; HTTPS when both are set | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const MESSAGEBOX_HOST_ENV: &str = "MESSAGEBOX_HOST";
pub const WALLET_API_URL_ENV: &str = "WALLET_API_URL";
pub const RELAY_BRIDGE_URL_ENV: &str = "RELAY_BRIDGE_URL";
pub const SESSION_TIMEOUT_ENV: &str = "SESSION_TIMEOUT_SECS";
pub const SESSION_SWEEP_INTERVAL_ENV: &str = "SESSION_SWEEP_INTERVAL_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_MESSAGEBOX_HOST: &str = "https://messagebox.babbage.systems";
pub const DEFAULT_WALLET_API_URL: &str = "http://localhost:3321";
pub const DEFAULT_RELAY_BRIDGE_URL: &str = "http://localhost:3322";
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 30 * 60;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5 * 60;

/// File name of the certification database inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "certifications.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid {expected}: {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),
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
pub struct Config {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub messagebox_host: String,
    pub wallet_api_url: Url,
    pub relay_bridge_url: Url,
    pub session_timeout: Duration,
    pub sweep_interval: Duration,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var(PORT_ENV) {
            Some(raw) => parse_nonzero(PORT_ENV, &raw, "port")?,
            None => u64::from(DEFAULT_PORT),
        };
        let port = u16::try_from(port).map_err(|_| ConfigError::Invalid {
            name: PORT_ENV,
            expected: "port",
            value: port.to_string(),
        })?;
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    name: HOST_ENV,
                    expected: "bind address",
                    value: host.clone(),
                })?;

        let messagebox_host =
            var(MESSAGEBOX_HOST_ENV).unwrap_or_else(|| DEFAULT_MESSAGEBOX_HOST.to_string());
        parse_url(MESSAGEBOX_HOST_ENV, &messagebox_host)?;

        let wallet_api_url = parse_url(
            WALLET_API_URL_ENV,
            &var(WALLET_API_URL_ENV).unwrap_or_else(|| DEFAULT_WALLET_API_URL.to_string()),
        )?;
        let relay_bridge_url = parse_url(
            RELAY_BRIDGE_URL_ENV,
            &var(RELAY_BRIDGE_URL_ENV).unwrap_or_else(|| DEFAULT_RELAY_BRIDGE_URL.to_string()),
        )?;

        let session_timeout = match var(SESSION_TIMEOUT_ENV) {
            Some(raw) => parse_nonzero(SESSION_TIMEOUT_ENV, &raw, "number of seconds")?,
            None => DEFAULT_SESSION_TIMEOUT_SECS,
        };
        let sweep_interval = match var(SESSION_SWEEP_INTERVAL_ENV) {
            Some(raw) => parse_nonzero(SESSION_SWEEP_INTERVAL_ENV, &raw, "number of seconds")?,
            None => DEFAULT_SWEEP_INTERVAL_SECS,
        };

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Incomplete(TLS_KEY_PATH_ENV, TLS_CERT_PATH_ENV)),
        };

        let log_format = match var(LOG_FORMAT_ENV).as_deref().map(str::to_ascii_lowercase) {
            None => LogFormat::Pretty,
            Some(f) if f == "pretty" => LogFormat::Pretty,
            Some(f) if f == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    expected: "log format (json|pretty)",
                    value: other,
                })
            }
        };

        Ok(Self {
            bind_addr,
            data_dir: PathBuf::from(var(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())),
            messagebox_host,
            wallet_api_url,
            relay_bridge_url,
            session_timeout: Duration::from_secs(session_timeout),
            sweep_interval: Duration::from_secs(sweep_interval),
            tls,
            log_format,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

/// Parse a URL and make sure it ends in `/` so method names join under it.
fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|_| ConfigError::Invalid {
        name,
        expected: "URL",
        value: raw.to_string(),
    })
}

fn parse_nonzero(name: &'static str, raw: &str, expected: &'static str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ConfigError::Invalid {
            name,
            expected,
            value: raw.to_string(),
        }),
    }
}
