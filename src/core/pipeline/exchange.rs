//! Request/response types shared by every pipeline stage.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Fully buffered inbound request.
pub type Request = http::Request<Bytes>;

/// Fully buffered outbound response.
pub type Response = http::Response<Bytes>;

/// Peer address of the connection the request arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

impl RemoteAddr {
    /// Reads the peer address from request extensions, or `"-"` when unknown.
    #[must_use]
    pub fn of(req: &Request) -> &str {
        req.extensions()
            .get::<Self>()
            .map_or("-", |addr| addr.0.as_str())
    }
}

/// Headers written on the way in, merged into whatever response comes back.
///
/// The map is shared between the pipeline entry point and the request, so
/// headers staged before a panic still reach the recovery response.
#[derive(Debug, Clone, Default)]
pub struct StagedHeaders(Arc<Mutex<HeaderMap>>);

impl StagedHeaders {
    /// Installs a fresh staging map on the request and returns a handle to it.
    pub fn attach(req: &mut Request) -> Self {
        let staged = Self::default();
        req.extensions_mut().insert(staged.clone());
        staged
    }

    /// Replaces any staged value for `name`.
    pub fn insert(req: &Request, name: HeaderName, value: HeaderValue) {
        if let Some(staged) = req.extensions().get::<Self>() {
            staged.lock().insert(name, value);
        }
    }

    /// Adds a staged value for `name`, keeping earlier ones.
    pub fn append(req: &Request, name: HeaderName, value: HeaderValue) {
        if let Some(staged) = req.extensions().get::<Self>() {
            staged.lock().append(name, value);
        }
    }

    /// Merges the staged headers into `resp`.
    ///
    /// A header the response already carries wins, except `Set-Cookie`,
    /// whose staged values are always appended.
    pub fn apply(&self, resp: &mut Response) {
        let staged = std::mem::take(&mut *self.lock());
        let present: HashSet<HeaderName> = resp.headers().keys().cloned().collect();

        let mut current: Option<HeaderName> = None;
        for (name, value) in staged {
            if let Some(name) = name {
                current = Some(name);
            }
            let Some(name) = current.as_ref() else {
                continue;
            };
            if *name == SET_COOKIE || !present.contains(name) {
                resp.headers_mut().append(name.clone(), value);
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HeaderMap> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the value of cookie `name` from the `Cookie` request headers.
#[must_use]
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}
