//! Middleware components.
//!
//! Panic recovery, request logging, security headers, sessions, CSRF
//! protection and authentication.

mod auth;
mod csrf;
mod headers;
mod logging;
mod recover;
mod session;

pub use auth::{Authenticate, RequireAuthentication};
pub use csrf::CsrfGuard;
pub use headers::SecureHeaders;
pub use logging::LogRequest;
pub use recover::{RecoverPanic, install_panic_hook};
pub use session::{SESSION_COOKIE_NAME, SessionManager, format_set_cookie};
