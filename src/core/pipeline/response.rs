//! HTTP response utilities.
//!
//! Provides shared constructors for HTML, redirect and error responses and
//! the central server-error responder.

use super::exchange::Response;
use crate::config::AppError;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue, LOCATION};
use http::{Method, StatusCode, Uri};
use std::backtrace::Backtrace;
use std::fmt::Display;
use tracing::error;

fn build(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response {
    let mut resp = Response::new(body.into());
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    resp
}

/// Serves an HTML body.
#[must_use]
pub fn html(status: StatusCode, body: String) -> Response {
    build(status, "text/html; charset=utf-8", body)
}

/// Serves a plain-text body.
#[must_use]
pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Response {
    build(status, "text/plain; charset=utf-8", body)
}

/// Serves a `303 See Other` to `location`.
#[must_use]
pub fn redirect(location: &str) -> Response {
    let mut resp = Response::new(Bytes::new());
    *resp.status_mut() = StatusCode::SEE_OTHER;
    let value = HeaderValue::try_from(location).unwrap_or_else(|_| HeaderValue::from_static("/"));
    resp.headers_mut().insert(LOCATION, value);
    resp
}

/// Answers with the canonical reason phrase of `status` as the body.
#[must_use]
pub fn client_error(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or("Error");
    text(status, format!("{reason}\n"))
}

#[must_use]
pub fn not_found() -> Response {
    client_error(StatusCode::NOT_FOUND)
}

/// Logs a server-side failure with a backtrace and answers with an opaque 500.
#[must_use]
pub fn server_error(method: &Method, uri: &Uri, err: &dyn Display) -> Response {
    let trace = Backtrace::force_capture();
    error!(
        method = %method,
        uri = %uri,
        error = %err,
        trace = %trace,
        "server error"
    );
    text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n")
}

/// Logs a recovered panic and answers with an opaque 500. The fault site and
/// its backtrace are logged by the panic hook.
#[must_use]
pub fn panic_error(method: &Method, uri: &Uri, message: &str) -> Response {
    error!(
        method = %method,
        uri = %uri,
        error = %message,
        "panic recovered"
    );
    text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n")
}

/// Maps an application error to its response.
#[must_use]
pub fn from_error(method: &Method, uri: &Uri, err: &AppError) -> Response {
    if err.is_client_error() {
        client_error(err.status())
    } else {
        server_error(method, uri, err)
    }
}
