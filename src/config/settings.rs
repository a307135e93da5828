//! Configuration settings.
//!
//! Defines the main `Config` struct and environment variable loading logic.

use super::{AppError, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_bool_or(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| {
        let v = v.to_lowercase();
        v == "true" || v == "1"
    })
}

fn get_env_u64_or(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn get_env_usize_or(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Certificate and key used for the TLS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP(S) listener binds to.
    pub listen_addr: SocketAddr,
    /// TLS material; plain HTTP when absent.
    pub tls: Option<TlsPaths>,
    /// Mark session and CSRF cookies `Secure`.
    pub cookie_secure: bool,
    /// Fixed session lifetime measured from creation.
    pub session_lifetime_secs: u64,
    /// Interval between sweeps of expired sessions.
    pub session_cleanup_secs: u64,
    /// Largest request body accepted, in bytes.
    pub max_body_size: usize,
    /// Logging format: "json" or "pretty".
    pub log_format: String,
    /// Name shown in the page header.
    pub app_name: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Panics
    ///
    /// Panics with the [`Config::try_from_env`] error on misconfiguration.
    #[must_use]
    pub fn from_env() -> Arc<Self> {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(e) => panic!("{e}"),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// `AppError::Config` if `LISTEN_ADDR` is not a valid socket address, or
    /// if only one of `TLS_CERT_PATH` / `TLS_KEY_PATH` is set.
    pub fn try_from_env() -> Result<Arc<Self>> {
        let raw_addr = get_env_or("LISTEN_ADDR", "127.0.0.1:4000");
        let listen_addr = raw_addr.parse().map_err(|_| {
            AppError::Config(format!(
                "LISTEN_ADDR must be a valid socket address, got {raw_addr:?}"
            ))
        })?;

        let cert = env::var("TLS_CERT_PATH").ok().filter(|s| !s.is_empty());
        let key = env::var("TLS_KEY_PATH").ok().filter(|s| !s.is_empty());
        let tls = match (cert, key) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "TLS_CERT_PATH and TLS_KEY_PATH must be set together".to_string(),
                ));
            }
        };

        Ok(Arc::new(Self {
            listen_addr,
            tls,
            cookie_secure: get_env_bool_or("COOKIE_SECURE", true),
            session_lifetime_secs: get_env_u64_or("SESSION_LIFETIME_SECS", 12 * 60 * 60),
            session_cleanup_secs: get_env_u64_or("SESSION_CLEANUP_SECS", 300),
            max_body_size: get_env_usize_or("MAX_BODY_SIZE", 64 * 1024),
            log_format: get_env_or("LOG_FORMAT", "json"),
            app_name: get_env_or("APP_NAME", "Snippetbox"),
        }))
    }
}
