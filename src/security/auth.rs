//! Per-request authentication status.
//!
//! The status lives in request extensions under a private wrapper type, so
//! only this module can set it.

use crate::core::pipeline::Request;

/// Session key holding the logged-in user's id.
pub const AUTHENTICATED_USER_ID: &str = "authenticatedUserID";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    /// Not derived yet for this request.
    #[default]
    Unset,
    Anonymous,
    Authenticated,
}

#[derive(Debug, Clone, Copy)]
struct AuthKey(AuthStatus);

impl AuthStatus {
    /// Status derived for `req`, `Unset` if the authenticate step never ran.
    #[must_use]
    pub fn of(req: &Request) -> Self {
        req.extensions()
            .get::<AuthKey>()
            .map_or(Self::Unset, |key| key.0)
    }

    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }

    pub(crate) fn attach(self, req: &mut Request) {
        req.extensions_mut().insert(AuthKey(self));
    }
}
