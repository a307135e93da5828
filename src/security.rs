//! Security components.
//!
//! Sessions, CSRF tokens, authentication status and password hashing.

pub mod auth;
pub mod csrf;
pub mod password;
pub mod session;
