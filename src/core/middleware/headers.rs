//! Security header injection.
//!
//! Headers are staged before anything downstream runs so they also land on
//! error and recovery responses.

use crate::core::pipeline::{Handler, Middleware, Request, Response, StagedHeaders};
use async_trait::async_trait;
use http::header::{
    CONTENT_SECURITY_POLICY, HeaderName, HeaderValue, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use std::sync::Arc;

const SECURITY_HEADERS: [(HeaderName, &str); 5] = [
    (
        CONTENT_SECURITY_POLICY,
        "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com",
    ),
    (REFERRER_POLICY, "origin-when-cross-origin"),
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (X_FRAME_OPTIONS, "deny"),
    (X_XSS_PROTECTION, "0"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SecureHeaders;

#[async_trait]
impl Middleware for SecureHeaders {
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Response {
        for (name, value) in SECURITY_HEADERS {
            StagedHeaders::insert(&req, name, HeaderValue::from_static(value));
        }
        next.call(req).await
    }
}
