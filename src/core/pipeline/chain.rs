//! Handler and middleware composition.
//!
//! A `Chain` is an ordered, immutable list of middleware. Calling `then`
//! folds the layers around a terminal handler, outermost first.

use super::exchange::{Request, Response};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Terminal request handler.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, req: Request) -> Response;
}

/// Wrapper that runs around the rest of the chain.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Response;
}

/// Ordered list of middleware, outermost first.
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new chain with `layer` added innermost.
    #[must_use]
    pub fn append(&self, layer: impl Middleware) -> Self {
        let mut layers = self.layers.clone();
        layers.push(Arc::new(layer));
        Self { layers }
    }

    /// Returns a new chain with all of `other`'s layers added innermost.
    #[must_use]
    pub fn extend(&self, other: &Self) -> Self {
        let mut layers = self.layers.clone();
        layers.extend(other.layers.iter().cloned());
        Self { layers }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wraps `handler` with every layer of the chain.
    #[must_use]
    pub fn then(&self, handler: Arc<dyn Handler>) -> Arc<dyn Handler> {
        self.layers.iter().rev().fold(handler, |next, layer| {
            Arc::new(Layered {
                layer: layer.clone(),
                next,
            })
        })
    }
}

struct Layered {
    layer: Arc<dyn Middleware>,
    next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for Layered {
    async fn call(&self, req: Request) -> Response {
        self.layer.handle(req, self.next.clone()).await
    }
}

/// Handler backed by an async closure.
pub struct HandlerFn<F>(F);

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    async fn call(&self, req: Request) -> Response {
        (self.0)(req).await
    }
}

/// Wraps an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(HandlerFn(f))
}
