//! CSRF double-submit guard.
//!
//! Ensures every visitor holds a CSRF cookie and rejects unsafe-method
//! requests whose submitted token does not match it.

use super::session::format_set_cookie;
use crate::core::pipeline::response::client_error;
use crate::core::pipeline::{
    FormValues, Handler, Middleware, Request, Response, StagedHeaders, read_cookie,
};
use crate::security::csrf::{
    self, CSRF_COOKIE_MAX_AGE, CSRF_COOKIE_NAME, CSRF_FIELD_NAME, CSRF_HEADER_NAME, CsrfToken,
};
use async_trait::async_trait;
use http::header::{HeaderValue, SET_COOKIE};
use http::{Method, StatusCode};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct CsrfGuard {
    secure: bool,
}

impl CsrfGuard {
    #[must_use]
    pub const fn new(secure: bool) -> Self {
        Self { secure }
    }
}

fn is_unsafe(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn submitted_token(req: &Request) -> Option<String> {
    if let Some(value) = req
        .headers()
        .get(CSRF_HEADER_NAME)
        .and_then(|v| v.to_str().ok())
    {
        return Some(value.to_string());
    }
    let form = FormValues::parse(req.body());
    form.contains(CSRF_FIELD_NAME)
        .then(|| form.get(CSRF_FIELD_NAME).to_string())
}

#[async_trait]
impl Middleware for CsrfGuard {
    async fn handle(&self, mut req: Request, next: Arc<dyn Handler>) -> Response {
        let existing = read_cookie(req.headers(), CSRF_COOKIE_NAME).and_then(csrf::decode);

        let token = if let Some(token) = existing {
            token
        } else {
            let token = csrf::generate();
            let cookie = format_set_cookie(
                CSRF_COOKIE_NAME,
                &csrf::encode(&token),
                CSRF_COOKIE_MAX_AGE,
                self.secure,
            );
            if let Ok(value) = HeaderValue::try_from(cookie) {
                StagedHeaders::append(&req, SET_COOKIE, value);
            }
            token
        };

        if is_unsafe(req.method()) {
            // A freshly issued cookie can never match what was sent.
            let ok = existing.is_some()
                && submitted_token(&req).is_some_and(|sent| csrf::verify(&token, &sent));
            if !ok {
                warn!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    "csrf token check failed"
                );
                return client_error(StatusCode::BAD_REQUEST);
            }
        }

        req.extensions_mut().insert(CsrfToken(csrf::mask(&token)));
        next.call(req).await
    }
}
