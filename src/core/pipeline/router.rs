//! Method and path dispatch.
//!
//! Patterns are `/`-separated segments; `{name}` captures one segment into
//! the request's `Params`. A known path requested with the wrong method is
//! answered with `405` and an `Allow` header.

use super::chain::Handler;
use super::exchange::{Request, Response};
use super::response;
use async_trait::async_trait;
use http::header::{ALLOW, HeaderValue};
use http::{Method, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .trim_start_matches('/')
        .split('/')
        .map(|seg| {
            seg.strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map_or_else(
                    || Segment::Literal(seg.to_string()),
                    |name| Segment::Param(name.to_string()),
                )
        })
        .collect()
}

/// Path parameters captured by the matched route.
#[derive(Debug, Clone, Default)]
pub struct Params(HashMap<String, String>);

impl Params {
    /// Reads the captured parameters from the request, empty if none.
    #[must_use]
    pub fn of(req: &Request) -> Self {
        req.extensions().get::<Self>().cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

struct Route {
    method: Method,
    segments: Vec<Segment>,
    handler: Arc<dyn Handler>,
}

impl Route {
    fn matches(&self, path: &[&str]) -> Option<Params> {
        if path.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    params.insert(name.clone(), (*part).to_string());
                }
                _ => return None,
            }
        }
        Some(Params(params))
    }
}

/// Route table built once at startup.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` on `pattern`.
    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, handler: Arc<dyn Handler>) -> Self {
        self.routes.push(Route {
            method,
            segments: parse_pattern(pattern),
            handler,
        });
        self
    }

    fn dispatch(&self, mut req: Request) -> Result<(Arc<dyn Handler>, Request), Response> {
        let path = req.uri().path().to_string();
        let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        let mut allowed: Vec<&Method> = Vec::new();
        for route in &self.routes {
            let Some(params) = route.matches(&parts) else {
                continue;
            };
            let head_as_get = req.method() == Method::HEAD && route.method == Method::GET;
            if route.method == req.method() || head_as_get {
                req.extensions_mut().insert(params);
                return Ok((route.handler.clone(), req));
            }
            if !allowed.contains(&&route.method) {
                allowed.push(&route.method);
            }
        }

        if allowed.is_empty() {
            return Err(response::not_found());
        }

        let allow = allowed
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let mut resp = response::client_error(StatusCode::METHOD_NOT_ALLOWED);
        if let Ok(value) = HeaderValue::try_from(allow) {
            resp.headers_mut().insert(ALLOW, value);
        }
        Err(resp)
    }
}

#[async_trait]
impl Handler for Router {
    async fn call(&self, req: Request) -> Response {
        match self.dispatch(req) {
            Ok((handler, req)) => handler.call(req).await,
            Err(resp) => resp,
        }
    }
}
