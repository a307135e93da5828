//! `Snipbox` - Server-rendered snippet sharing.
//!
//! Copyright (C) 2026 Maverick
//! SPDX-License-Identifier: AGPL-3.0-only
//!
//! Initializes the application runtime, loads configuration, sets up logging,
//! and launches the HTTP(S) service.

use snipbox::core::middleware::install_panic_hook;
use snipbox::{
    App, Config, MemorySnippetStore, MemoryStore, MemoryUserStore, listening_service,
};

use pingora::server::Server;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    dotenvy::dotenv().ok();

    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(non_blocking);

    if log_format.eq_ignore_ascii_case("pretty") {
        subscriber.init();
    } else {
        subscriber.json().init();
    }
    install_panic_hook();

    let config = Config::from_env();
    info!(
        listen_addr = %config.listen_addr,
        tls = config.tls.is_some(),
        cookie_secure = config.cookie_secure,
        session_lifetime_secs = config.session_lifetime_secs,
        log_format = %config.log_format,
        "Server initialized"
    );

    let sessions = MemoryStore::new();
    sessions.start_cleanup(Duration::from_secs(config.session_cleanup_secs));

    let app = Arc::new(App::new(
        config.clone(),
        Arc::new(MemorySnippetStore::new()),
        Arc::new(MemoryUserStore::new()),
        Arc::new(sessions),
    ));

    let mut server = Server::new(None).expect("Failed to create Pingora server");
    server.bootstrap();

    let service = listening_service(app, &config).expect("Failed to configure listener");
    server.add_service(service);

    server.run_forever();
}
