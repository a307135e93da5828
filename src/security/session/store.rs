//! Session persistence.
//!
//! Records are keyed by the digest of the client token, never the token
//! itself.

use super::state::SessionRecord;
use crate::config::Result;
use crate::core::unix_now;
use async_trait::async_trait;
use papaya::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Backend holding session records.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Returns the live record for `key`, `None` if missing or expired.
    async fn find(&self, key: &str) -> Result<Option<SessionRecord>>;

    /// Inserts or replaces the record for `key`.
    async fn commit(&self, key: &str, record: SessionRecord) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-process session store on a lock-free map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every record whose deadline has passed. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = unix_now();
        let records = self.records.pin();
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        before.saturating_sub(records.len())
    }

    /// Spawns a background thread purging expired records every `interval`.
    pub fn start_cleanup(&self, interval: Duration) {
        let store = self.clone();
        thread::spawn(move || {
            loop {
                thread::sleep(interval);
                let purged = store.purge_expired();
                if purged > 0 {
                    debug!(purged, "expired sessions removed");
                }
            }
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.pin().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find(&self, key: &str) -> Result<Option<SessionRecord>> {
        let now = unix_now();
        Ok(self
            .records
            .pin()
            .get(key)
            .filter(|record| !record.is_expired(now))
            .cloned())
    }

    async fn commit(&self, key: &str, record: SessionRecord) -> Result<()> {
        self.records.pin().insert(key.to_string(), record);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.records.pin().remove(key);
        Ok(())
    }
}
