//! Request pipeline.
//!
//! Buffered request/response types, middleware composition, routing, form
//! decoding and shared response constructors.

mod chain;
mod exchange;
pub mod form;
pub mod response;
mod router;

pub use chain::{Chain, Handler, HandlerFn, Middleware, handler_fn};
pub use exchange::{RemoteAddr, Request, Response, StagedHeaders, read_cookie};
pub use form::FormValues;
pub use router::{Params, Router};

use std::sync::Arc;

/// Entry point that owns the fully composed handler tree.
#[derive(Clone)]
pub struct Pipeline {
    root: Arc<dyn Handler>,
}

impl Pipeline {
    #[must_use]
    pub fn new(root: Arc<dyn Handler>) -> Self {
        Self { root }
    }

    /// Runs one request through the pipeline and applies staged headers.
    pub async fn handle(&self, mut req: Request) -> Response {
        let staged = StagedHeaders::attach(&mut req);
        let mut resp = self.root.call(req).await;
        staged.apply(&mut resp);
        resp
    }
}
