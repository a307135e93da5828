#![allow(dead_code)]

use bytes::Bytes;
use http::header::{CONTENT_TYPE, COOKIE, HeaderMap, SET_COOKIE};
use http::{Method, StatusCode};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use pingora::server::Server;
use snipbox::core::pipeline::RemoteAddr;
use snipbox::{
    App, Config, MemorySnippetStore, MemoryStore, MemoryUserStore, SnippetStore,
    listening_service,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub fn create_test_config() -> Arc<Config> {
    Arc::new(Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        tls: None,
        cookie_secure: false,
        session_lifetime_secs: 3600,
        session_cleanup_secs: 300,
        max_body_size: 64 * 1024,
        log_format: "pretty".to_string(),
        app_name: "TestApp".to_string(),
    })
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Hidden `csrf_token` field value of the first form on the page.
    pub fn csrf_token(&self) -> Option<String> {
        let marker = "name='csrf_token' value='";
        let start = self.body.find(marker)? + marker.len();
        let end = self.body[start..].find('\'')?;
        Some(self.body[start..start + end].to_string())
    }
}

/// In-process client that keeps cookies between requests.
pub struct TestClient {
    pub app: App,
    pub snippets: MemorySnippetStore,
    pub users: MemoryUserStore,
    pub sessions: MemoryStore,
    jar: Mutex<HashMap<String, String>>,
}

impl TestClient {
    pub fn new() -> Self {
        let snippets = MemorySnippetStore::new();
        Self::with_snippet_store(snippets.clone(), Arc::new(snippets))
    }

    /// Uses `store` for snippets while keeping `snippets` as the inspectable
    /// handle.
    pub fn with_snippet_store(
        snippets: MemorySnippetStore,
        store: Arc<dyn SnippetStore>,
    ) -> Self {
        let users = MemoryUserStore::new();
        let sessions = MemoryStore::new();
        let app = App::new(
            create_test_config(),
            store,
            Arc::new(users.clone()),
            Arc::new(sessions.clone()),
        );
        Self {
            app,
            snippets,
            users,
            sessions,
            jar: Mutex::new(HashMap::new()),
        }
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.jar.lock().unwrap().get(name).cloned()
    }

    pub fn set_cookie(&self, name: &str, value: &str) {
        self.jar
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    pub fn clear_cookies(&self) {
        self.jar.lock().unwrap().clear();
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<String>) -> TestResponse {
        let mut builder = http::Request::builder().method(method).uri(uri);

        let cookies = {
            let jar = self.jar.lock().unwrap();
            jar.iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ")
        };
        if !cookies.is_empty() {
            builder = builder.header(COOKIE, cookies);
        }
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        }

        let mut req = builder
            .body(Bytes::from(body.unwrap_or_default()))
            .unwrap();
        req.extensions_mut()
            .insert(RemoteAddr("127.0.0.1:40000".to_string()));

        let resp = self.app.handle(req).await;
        self.store_cookies(resp.headers());

        TestResponse {
            status: resp.status(),
            headers: resp.headers().clone(),
            body: String::from_utf8_lossy(resp.body()).into_owned(),
        }
    }

    fn store_cookies(&self, headers: &HeaderMap) {
        let mut jar = self.jar.lock().unwrap();
        for value in headers.get_all(SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let Some((pair, attrs)) = raw.split_once(';') else {
                continue;
            };
            let (name, value) = pair.split_once('=').unwrap();
            if value.is_empty() || attrs.contains("Max-Age=0") {
                jar.remove(name);
            } else {
                jar.insert(name.to_string(), value.to_string());
            }
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send(Method::POST, uri, Some(encode_form(fields))).await
    }

    /// Fetches `page` for a fresh CSRF token, then posts `fields` to `action`.
    pub async fn submit(&self, page: &str, action: &str, fields: &[(&str, &str)]) -> TestResponse {
        let token = self
            .get(page)
            .await
            .csrf_token()
            .expect("page has a csrf token");
        let mut all = fields.to_vec();
        all.push(("csrf_token", token.as_str()));
        self.post_form(action, &all).await
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.submit(
            "/user/signup",
            "/user/signup",
            &[("name", name), ("email", email), ("password", password)],
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.submit(
            "/user/login",
            "/user/login",
            &[("email", email), ("password", password)],
        )
        .await
    }

    /// Signs up and logs in a default user.
    pub async fn logged_in() -> Self {
        let client = Self::new();
        client
            .signup("Alice", "alice@example.com", "pa$$word123")
            .await;
        let resp = client.login("alice@example.com", "pa$$word123").await;
        assert_eq!(resp.status, StatusCode::SEE_OTHER);
        client
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, NON_ALPHANUMERIC),
                utf8_percent_encode(v, NON_ALPHANUMERIC)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Starts the pingora listener in a background thread.
pub async fn spawn_server(config: Arc<Config>) -> (u16, std::thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut conf_clone = (*config).clone();
    conf_clone.listen_addr = format!("127.0.0.1:{port}").parse().unwrap();
    let config = Arc::new(conf_clone);

    let handle = std::thread::spawn(move || {
        let app = Arc::new(App::new(
            config.clone(),
            Arc::new(MemorySnippetStore::new()),
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryStore::new()),
        ));

        let service = listening_service(app, &config).unwrap();
        let mut server = Server::new(None).unwrap();
        server.bootstrap();
        server.add_service(service);
        server.run_forever();
    });

    tokio::time::sleep(Duration::from_secs(3)).await;
    (port, handle)
}
