//! Library definitions.
//!
//! Exports the application, its middleware pipeline, stores and the pingora
//! serving adapter.

pub mod app;
pub mod config;
pub mod core;
pub mod models;
pub mod security;
pub mod web;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use app::App;
pub use config::{AppError, Config, Result};
pub use core::middleware::{SESSION_COOKIE_NAME, SessionManager, format_set_cookie};
pub use core::pipeline::{Pipeline, Request, Response};
pub use core::server::{SnipboxService, listening_service};
pub use models::{MemorySnippetStore, MemoryUserStore, SnippetStore, UserStore};
pub use security::session::{MemoryStore, SessionStore};
