//! Argon2id password hashing.
//!
//! Hashing is CPU and memory heavy, so the async wrappers run it on the
//! blocking pool.

use crate::config::{AppError, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hashes `password` into a PHC string.
///
/// # Errors
///
/// Returns `AppError::Internal` if hashing fails.
pub fn hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

/// Checks `password` against a PHC string.
///
/// # Errors
///
/// Returns `AppError::Internal` if the stored hash is malformed.
pub fn verify(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// [`hash`] on the blocking pool.
///
/// # Errors
///
/// Returns `AppError::Internal` if hashing fails or the task is lost.
pub async fn hash_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
}

/// [`verify`] on the blocking pool.
///
/// # Errors
///
/// Returns `AppError::Internal` if the hash is malformed or the task is lost.
pub async fn verify_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))?
}
