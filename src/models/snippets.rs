//! Snippet storage.

use crate::config::{AppError, Result};
use crate::core::unix_now;
use async_trait::async_trait;
use papaya::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

const LATEST_LIMIT: usize = 10;
const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Unix seconds.
    pub created: u64,
    /// Unix seconds.
    pub expires: u64,
}

impl Snippet {
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires <= now
    }
}

#[async_trait]
pub trait SnippetStore: Send + Sync + 'static {
    /// Returns the unexpired snippet with `id`.
    ///
    /// # Errors
    ///
    /// `AppError::NoRecord` when no live snippet matches.
    async fn get(&self, id: i64) -> Result<Snippet>;

    /// Up to ten unexpired snippets, newest first.
    async fn latest(&self) -> Result<Vec<Snippet>>;

    /// Stores a snippet expiring `expires_days` from now and returns its id.
    async fn insert(&self, title: &str, content: &str, expires_days: i64) -> Result<i64>;
}

#[derive(Clone)]
pub struct MemorySnippetStore {
    snippets: Arc<HashMap<i64, Snippet>>,
    next_id: Arc<AtomicI64>,
}

impl Default for MemorySnippetStore {
    fn default() -> Self {
        Self {
            snippets: Arc::new(HashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl MemorySnippetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snippets.pin().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a fully formed record, keeping ids monotonic.
    pub fn insert_record(&self, snippet: Snippet) {
        self.next_id.fetch_max(snippet.id + 1, Ordering::Relaxed);
        self.snippets.pin().insert(snippet.id, snippet);
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn get(&self, id: i64) -> Result<Snippet> {
        let now = unix_now();
        self.snippets
            .pin()
            .get(&id)
            .filter(|s| !s.is_expired(now))
            .cloned()
            .ok_or(AppError::NoRecord)
    }

    async fn latest(&self) -> Result<Vec<Snippet>> {
        let now = unix_now();
        let snippets = self.snippets.pin();
        let mut live: Vec<Snippet> = snippets
            .iter()
            .map(|(_, s)| s)
            .filter(|s| !s.is_expired(now))
            .cloned()
            .collect();
        live.sort_unstable_by(|a, b| b.id.cmp(&a.id));
        live.truncate(LATEST_LIMIT);
        Ok(live)
    }

    async fn insert(&self, title: &str, content: &str, expires_days: i64) -> Result<i64> {
        let days = u64::try_from(expires_days)
            .map_err(|_| AppError::Storage(format!("invalid expiry: {expires_days} days")))?;
        let created = unix_now();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.snippets.pin().insert(
            id,
            Snippet {
                id,
                title: title.to_string(),
                content: content.to_string(),
                created,
                expires: created.saturating_add(days.saturating_mul(SECS_PER_DAY)),
            },
        );
        Ok(id)
    }
}
