use crate::common::TestClient;
use async_trait::async_trait;
use http::{Method, StatusCode};
use snipbox::models::Snippet;
use snipbox::{MemorySnippetStore, SESSION_COOKIE_NAME, SnippetStore};
use std::sync::Arc;

const SECURITY_HEADERS: [(&str, &str); 5] = [
    (
        "content-security-policy",
        "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com",
    ),
    ("referrer-policy", "origin-when-cross-origin"),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "deny"),
    ("x-xss-protection", "0"),
];

struct PanickingStore;

#[async_trait]
impl SnippetStore for PanickingStore {
    async fn get(&self, _id: i64) -> snipbox::Result<Snippet> {
        panic!("store exploded");
    }

    async fn latest(&self) -> snipbox::Result<Vec<Snippet>> {
        panic!("store exploded");
    }

    async fn insert(&self, _title: &str, _content: &str, _expires: i64) -> snipbox::Result<i64> {
        panic!("store exploded");
    }
}

fn assert_security_headers(resp: &crate::common::TestResponse) {
    for (name, value) in SECURITY_HEADERS {
        assert_eq!(resp.header(name), Some(value), "header {name}");
    }
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let client = TestClient::new();

    let home = client.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert_security_headers(&home);

    let missing = client.get("/no/such/page").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body, "Not Found\n");
    assert_security_headers(&missing);

    let ping = client.get("/ping").await;
    assert_security_headers(&ping);
}

#[tokio::test]
async fn test_panic_is_recovered() {
    let client =
        TestClient::with_snippet_store(MemorySnippetStore::new(), Arc::new(PanickingStore));

    let resp = client.get("/").await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body, "Internal Server Error\n");
    assert_eq!(resp.header("connection"), Some("close"));
    assert_security_headers(&resp);

    let ping = client.get("/ping").await;
    assert_eq!(ping.status, StatusCode::OK);
    assert!(ping.header("connection").is_none());
}

#[tokio::test]
async fn test_wrong_method_lists_allowed() {
    let client = TestClient::new();

    let resp = client.post_form("/", &[]).await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.header("allow"), Some("GET"));

    let resp = client.send(Method::DELETE, "/user/login", None).await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.header("allow"), Some("GET, POST"));
}

#[tokio::test]
async fn test_ping_and_static_assets() {
    let client = TestClient::new();

    let ping = client.get("/ping").await;
    assert_eq!(ping.status, StatusCode::OK);
    assert_eq!(ping.body, "OK");

    let css = client.get("/static/main.css").await;
    assert_eq!(css.status, StatusCode::OK);
    assert!(css.header("content-type").unwrap().starts_with("text/css"));
    assert!(!css.body.is_empty());

    let missing = client.get("/static/nope.js").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stateless_routes_set_no_cookies() {
    let client = TestClient::new();

    for path in ["/ping", "/static/main.css", "/missing"] {
        let resp = client.get(path).await;
        assert!(resp.header("set-cookie").is_none(), "{path}");
    }
    assert!(client.cookie(SESSION_COOKIE_NAME).is_none());
    assert!(client.sessions.is_empty());
}

#[tokio::test]
async fn test_untouched_session_is_not_saved() {
    let client = TestClient::new();
    let resp = client.get("/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(client.cookie(SESSION_COOKIE_NAME).is_none());
    assert!(client.sessions.is_empty());
}

#[tokio::test]
async fn test_head_served_by_get_route() {
    let client = TestClient::new();
    let resp = client.send(Method::HEAD, "/ping", None).await;
    assert_eq!(resp.status, StatusCode::OK);
}
