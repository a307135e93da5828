//! Application assembly.
//!
//! Wires configuration, stores, templates and the middleware chains into a
//! single request pipeline.

use crate::config::Config;
use crate::core::middleware::SessionManager;
use crate::core::pipeline::{Pipeline, Request, Response};
use crate::models::{SnippetStore, UserStore};
use crate::security::session::SessionStore;
use crate::web::AppState;
use crate::web::routes;
use std::sync::Arc;

/// Fully assembled application.
#[derive(Clone)]
pub struct App {
    pipeline: Pipeline,
    state: Arc<AppState>,
}

impl App {
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        snippets: Arc<dyn SnippetStore>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let manager = SessionManager::new(
            sessions,
            config.session_lifetime_secs,
            config.cookie_secure,
        );
        let state = Arc::new(AppState::new(config, snippets, users));
        let pipeline = Pipeline::new(routes::build(state.clone(), manager));
        Self { pipeline, state }
    }

    /// Runs one buffered request through the full pipeline.
    pub async fn handle(&self, req: Request) -> Response {
        self.pipeline.handle(req).await
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.state.config
    }
}
