use crate::common::TestClient;
use http::StatusCode;
use snipbox::SESSION_COOKIE_NAME;

#[tokio::test]
async fn test_signup_success_redirects_with_flash() {
    let client = TestClient::new();
    let resp = client
        .signup("Bob", "bob@example.com", "validpassword")
        .await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some("/user/login"));
    assert_eq!(client.users.len(), 1);

    let page = client.get("/user/login").await;
    assert!(page.body.contains("Your sign-up was successful. Please log in."));

    let again = client.get("/user/login").await;
    assert!(!again.body.contains("Your sign-up was successful"));
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let client = TestClient::new();
    client
        .signup("Bob", "dupe@example.com", "validpassword")
        .await;

    let resp = client
        .signup("Bobby", "dupe@example.com", "otherpassword")
        .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("Email address is already in use"));
    assert!(resp.body.contains("value='Bobby'"));
    assert_eq!(client.users.len(), 1);
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let client = TestClient::new();
    let resp = client.signup("", "not-an-email", "short").await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("This field cannot be blank"));
    assert!(resp.body.contains("This field must be a valid email address"));
    assert!(resp.body.contains("This field must be at least 8 characters long"));
    assert!(!resp.body.contains("short"));
    assert!(client.users.is_empty());
}

#[tokio::test]
async fn test_login_renews_session_token() {
    let client = TestClient::new();
    client
        .signup("Alice", "alice@example.com", "pa$$word123")
        .await;
    client.get("/user/login").await;
    let before = client.cookie(SESSION_COOKIE_NAME).expect("flash created a session");

    let resp = client.login("alice@example.com", "pa$$word123").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some("/snippet/create"));

    let after = client.cookie(SESSION_COOKIE_NAME).unwrap();
    assert_ne!(before, after);
    assert_eq!(client.sessions.len(), 1);

    let page = client.get("/snippet/create").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.header("cache-control"), Some("no-store"));
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let client = TestClient::new();
    client
        .signup("Alice", "alice@example.com", "pa$$word123")
        .await;

    let resp = client.login("alice@example.com", "wrong-password").await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("Email or password is incorrect"));
    assert!(resp.body.contains("value='alice@example.com'"));

    let page = client.get("/snippet/create").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_protected_routes_redirect_anonymous() {
    let client = TestClient::new();

    let resp = client.get("/snippet/create").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some("/user/login"));
    assert!(resp.body.is_empty());

    let token = client.get("/").await.csrf_token();
    assert!(token.is_none());
}

#[tokio::test]
async fn test_logout() {
    let client = TestClient::logged_in().await;
    let token = client.get("/").await.csrf_token().unwrap();
    let before = client.cookie(SESSION_COOKIE_NAME).unwrap();

    let resp = client
        .post_form("/user/logout", &[("csrf_token", token.as_str())])
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some("/"));
    assert_ne!(client.cookie(SESSION_COOKIE_NAME).unwrap(), before);

    let home = client.get("/").await;
    assert!(home.body.contains("You&#39;ve been logged out successfully!"));
    assert!(home.body.contains("/user/login"));

    let page = client.get("/snippet/create").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_deleted_user_becomes_anonymous() {
    let client = TestClient::logged_in().await;
    assert_eq!(client.get("/snippet/create").await.status, StatusCode::OK);
    let session = client.cookie(SESSION_COOKIE_NAME).unwrap();

    client.users.remove(1).unwrap();

    let resp = client.get("/snippet/create").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(client.cookie(SESSION_COOKIE_NAME).unwrap(), session);
    assert_eq!(client.sessions.len(), 1);
}

#[tokio::test]
async fn test_forged_session_cookie_is_anonymous() {
    let client = TestClient::new();
    client.set_cookie(SESSION_COOKIE_NAME, "forged-token");
    let resp = client.get("/snippet/create").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
}
