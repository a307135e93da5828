//! Per-request access log.

use crate::core::pipeline::{Handler, Middleware, RemoteAddr, Request, Response};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogRequest;

#[async_trait]
impl Middleware for LogRequest {
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Response {
        info!(
            ip = %RemoteAddr::of(&req),
            method = %req.method(),
            proto = ?req.version(),
            uri = %req.uri(),
            "received request"
        );
        next.call(req).await
    }
}
