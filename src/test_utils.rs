//! Shared fixtures for unit tests.
//!
//! Builds a plain-HTTP configuration and an application wired to fresh
//! in-memory stores that tests can inspect directly.

use crate::app::App;
use crate::config::Config;
use crate::models::{MemorySnippetStore, MemoryUserStore};
use crate::security::session::MemoryStore;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// Loopback configuration on port 4000 with non-`Secure` cookies and
/// one hour sessions.
#[must_use]
pub fn create_test_config() -> Arc<Config> {
    Arc::new(Config {
        listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4000),
        tls: None,
        cookie_secure: false,
        session_lifetime_secs: 3600,
        session_cleanup_secs: 300,
        max_body_size: 64 * 1024,
        log_format: "pretty".to_string(),
        app_name: "TestApp".to_string(),
    })
}

/// In-memory stores backing a test application.
#[derive(Clone, Default)]
pub struct TestStores {
    pub snippets: MemorySnippetStore,
    pub users: MemoryUserStore,
    pub sessions: MemoryStore,
}

/// Builds an application on fresh in-memory stores and returns both.
#[must_use]
pub fn create_test_app(config: Arc<Config>) -> (App, TestStores) {
    let stores = TestStores::default();
    let app = App::new(
        config,
        Arc::new(stores.snippets.clone()),
        Arc::new(stores.users.clone()),
        Arc::new(stores.sessions.clone()),
    );
    (app, stores)
}
