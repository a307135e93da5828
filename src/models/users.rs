//! User accounts.

use crate::config::{AppError, Result};
use crate::core::unix_now;
use crate::security::password;
use async_trait::async_trait;
use papaya::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2id PHC string.
    pub hashed_password: String,
    pub created: u64,
}

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Creates a user with a hashed copy of `password`.
    ///
    /// # Errors
    ///
    /// `AppError::DuplicateEmail` if the address is already registered.
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<()>;

    /// Returns the id of the user matching the credentials.
    ///
    /// # Errors
    ///
    /// `AppError::InvalidCredentials` on unknown email or wrong password.
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64>;

    async fn exists(&self, id: i64) -> Result<bool>;
}

#[derive(Clone)]
pub struct MemoryUserStore {
    users: Arc<HashMap<i64, User>>,
    by_email: Arc<HashMap<String, i64>>,
    next_id: Arc<AtomicI64>,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self {
            users: Arc::new(HashMap::new()),
            by_email: Arc::new(HashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: i64) -> Option<User> {
        self.users.pin().get(&id).cloned()
    }

    /// Deletes a user. Sessions pointing at it fall back to anonymous.
    pub fn remove(&self, id: i64) -> Option<User> {
        let user = self.users.pin().remove(&id).cloned()?;
        self.by_email.pin().remove(&user.email);
        Some(user)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.pin().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<()> {
        if self.by_email.pin().contains_key(email) {
            return Err(AppError::DuplicateEmail);
        }
        let hashed_password = password::hash_blocking(password.to_string()).await?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // The email index is the uniqueness constraint.
        if self.by_email.pin().try_insert(email.to_string(), id).is_err() {
            return Err(AppError::DuplicateEmail);
        }
        self.users.pin().insert(
            id,
            User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                hashed_password,
                created: unix_now(),
            },
        );
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64> {
        let Some(id) = self.by_email.pin().get(email).copied() else {
            return Err(AppError::InvalidCredentials);
        };
        let Some(hash) = self.users.pin().get(&id).map(|u| u.hashed_password.clone()) else {
            return Err(AppError::InvalidCredentials);
        };

        if password::verify_blocking(password.to_string(), hash).await? {
            Ok(id)
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        Ok(self.users.pin().contains_key(&id))
    }
}
