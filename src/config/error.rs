//! Error types and result aliases.
//!
//! Defines the core `AppError` enumeration and common `Result` type.

use http::StatusCode;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// No record matched the lookup.
    #[error("models: no matching record found")]
    NoRecord,

    /// A user with this email address already exists.
    #[error("models: duplicate email")]
    DuplicateEmail,

    /// Email/password pair did not match a user.
    #[error("models: invalid credentials")]
    InvalidCredentials,

    /// The request could not be decoded.
    #[error("malformed request: {0}")]
    BadRequest(String),

    /// Page template missing from the cache.
    #[error("the template {0} does not exist")]
    TemplateMissing(String),

    /// Template referenced a value the renderer does not know.
    #[error("template {page}: unknown placeholder {key}")]
    TemplatePlaceholder { page: String, key: String },

    /// Session store failure.
    #[error("session store error: {0}")]
    Session(String),

    /// Storage backend failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Anything else that should surface as a 500.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error is answered with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NoRecord => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error is the client's fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
