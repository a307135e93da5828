//! Request-scoped session state.
//!
//! A `Session` is loaded by the session middleware, shared with the handler
//! through request extensions, and committed once the handler returns.

use crate::config::{AppError, Result};
use crate::core::pipeline::Request;
use crate::core::unix_now;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Value stored under a session key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValue {
    Int(i64),
    Text(String),
}

impl From<i64> for SessionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<String> for SessionValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SessionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Persisted form of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub data: HashMap<String, SessionValue>,
    pub created: u64,
    /// Unix time after which the record is dead.
    pub deadline: u64,
}

impl SessionRecord {
    #[must_use]
    pub fn new(lifetime_secs: u64) -> Self {
        let now = unix_now();
        Self {
            data: HashMap::new(),
            created: now,
            deadline: now.saturating_add(lifetime_secs),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.deadline
    }
}

/// What the commit step has to do with a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unmodified,
    Modified,
    Destroyed,
}

#[derive(Debug)]
struct Inner {
    token: Option<String>,
    retired: Option<String>,
    record: SessionRecord,
    status: Status,
}

/// Handle to the current request's session data.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<Inner>>,
}

impl Session {
    /// Wraps a record loaded for `token`.
    #[must_use]
    pub fn loaded(token: String, record: SessionRecord) -> Self {
        Self::with(Some(token), record)
    }

    /// Starts an empty session with no token yet.
    #[must_use]
    pub fn fresh(lifetime_secs: u64) -> Self {
        Self::with(None, SessionRecord::new(lifetime_secs))
    }

    fn with(token: Option<String>, record: SessionRecord) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                token,
                retired: None,
                record,
                status: Status::Unmodified,
            })),
        }
    }

    /// Fetches the session attached by the session middleware.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the request did not pass through the
    /// session middleware.
    pub fn from_request(req: &Request) -> Result<Self> {
        req.extensions()
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::Session("no session in request context".to_string()))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn put(&self, key: &str, value: impl Into<SessionValue>) {
        let mut inner = self.lock();
        inner.record.data.insert(key.to_string(), value.into());
        inner.status = Status::Modified;
    }

    /// Integer under `key`, or 0 when absent or not an integer.
    #[must_use]
    pub fn get_int(&self, key: &str) -> i64 {
        match self.lock().record.data.get(key) {
            Some(SessionValue::Int(v)) => *v,
            _ => 0,
        }
    }

    /// String under `key`, or empty when absent or not a string.
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        match self.lock().record.data.get(key) {
            Some(SessionValue::Text(v)) => v.clone(),
            _ => String::new(),
        }
    }

    /// Reads and removes the string under `key`.
    pub fn pop_string(&self, key: &str) -> String {
        let mut inner = self.lock();
        match inner.record.data.remove(key) {
            Some(SessionValue::Text(v)) => {
                inner.status = Status::Modified;
                v
            }
            Some(other) => {
                inner.record.data.insert(key.to_string(), other);
                String::new()
            }
            None => String::new(),
        }
    }

    pub fn remove(&self, key: &str) {
        let mut inner = self.lock();
        if inner.record.data.remove(key).is_some() {
            inner.status = Status::Modified;
        }
    }

    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.lock().record.data.contains_key(key)
    }

    /// Issues a new token for the same data. The old token's record is
    /// deleted on commit.
    pub fn renew_token(&self) {
        let mut inner = self.lock();
        if let Some(old) = inner.token.take()
            && inner.retired.is_none()
        {
            inner.retired = Some(old);
        }
        inner.token = Some(generate_token());
        inner.status = Status::Modified;
    }

    /// Drops all data and the current token. The stored record is deleted on
    /// commit; if nothing is written afterwards the cookie is expired,
    /// otherwise the new data is saved under a fresh token.
    pub fn destroy(&self) {
        let mut inner = self.lock();
        if let Some(old) = inner.token.take()
            && inner.retired.is_none()
        {
            inner.retired = Some(old);
        }
        inner.record.data.clear();
        inner.status = Status::Destroyed;
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.lock().status
    }

    /// Current token, if one has been issued.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    /// Snapshot of everything the commit step needs. Issues a token for a
    /// modified session that does not have one yet.
    pub(crate) fn prepare_commit(&self) -> CommitPlan {
        let mut inner = self.lock();
        if inner.status == Status::Modified && inner.token.is_none() {
            inner.token = Some(generate_token());
        }
        CommitPlan {
            status: inner.status,
            token: inner.token.clone(),
            retired: inner.retired.clone(),
            record: inner.record.clone(),
        }
    }
}

/// Frozen view of a session at commit time.
#[derive(Debug, Clone)]
pub(crate) struct CommitPlan {
    pub status: Status,
    pub token: Option<String>,
    pub retired: Option<String>,
    pub record: SessionRecord,
}

/// Generates a new random session token.
#[must_use]
pub fn generate_token() -> String {
    let random_bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Store key for `token`: its SHA-256 digest, base64 encoded.
#[must_use]
pub fn store_key(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}
