//! Authentication derivation and the route guard.

use crate::core::pipeline::response::{redirect, server_error};
use crate::core::pipeline::{Handler, Middleware, Request, Response};
use crate::models::UserStore;
use crate::security::auth::{AUTHENTICATED_USER_ID, AuthStatus};
use crate::security::session::Session;
use async_trait::async_trait;
use http::header::{CACHE_CONTROL, HeaderValue};
use std::sync::Arc;

/// Derives the request's `AuthStatus` from the session and the user store.
#[derive(Clone)]
pub struct Authenticate {
    users: Arc<dyn UserStore>,
}

impl Authenticate {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Middleware for Authenticate {
    async fn handle(&self, mut req: Request, next: Arc<dyn Handler>) -> Response {
        let session = match Session::from_request(&req) {
            Ok(session) => session,
            Err(e) => return server_error(req.method(), req.uri(), &e),
        };

        let id = session.get_int(AUTHENTICATED_USER_ID);
        let status = if id == 0 {
            AuthStatus::Anonymous
        } else {
            match self.users.exists(id).await {
                Ok(true) => AuthStatus::Authenticated,
                Ok(false) => AuthStatus::Anonymous,
                Err(e) => return server_error(req.method(), req.uri(), &e),
            }
        };

        status.attach(&mut req);
        next.call(req).await
    }
}

/// Sends unauthenticated visitors to the login page.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireAuthentication;

#[async_trait]
impl Middleware for RequireAuthentication {
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Response {
        if !AuthStatus::of(&req).is_authenticated() {
            return redirect("/user/login");
        }

        let mut resp = next.call(req).await;
        resp.headers_mut()
            .append(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        resp
    }
}
