use crate::common::TestClient;
use http::StatusCode;

#[tokio::test]
async fn test_post_without_token_is_rejected() {
    let client = TestClient::new();
    client.get("/user/signup").await;

    for _ in 0..3 {
        let resp = client
            .post_form(
                "/user/signup",
                &[
                    ("name", "Eve"),
                    ("email", "eve@example.com"),
                    ("password", "validpassword"),
                ],
            )
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body, "Bad Request\n");
    }
    assert!(client.users.is_empty());
}

#[tokio::test]
async fn test_post_with_wrong_token_is_rejected() {
    let client = TestClient::new();
    client.get("/user/signup").await;

    let resp = client
        .post_form(
            "/user/signup",
            &[
                ("name", "Eve"),
                ("email", "eve@example.com"),
                ("password", "validpassword"),
                ("csrf_token", "bm90LWEtdmFsaWQtdG9rZW4"),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(client.users.is_empty());
}

#[tokio::test]
async fn test_token_from_another_client_is_rejected() {
    let victim = TestClient::new();
    let token = victim.get("/user/signup").await.csrf_token().unwrap();

    let attacker = TestClient::new();
    attacker.get("/user/signup").await;
    let resp = attacker
        .post_form(
            "/user/signup",
            &[
                ("name", "Eve"),
                ("email", "eve@example.com"),
                ("password", "validpassword"),
                ("csrf_token", token.as_str()),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_first_post_without_cookie_is_rejected() {
    let client = TestClient::new();
    let token = client.get("/user/login").await.csrf_token().unwrap();
    client.clear_cookies();

    let resp = client
        .post_form(
            "/user/login",
            &[
                ("email", "a@example.com"),
                ("password", "whatever"),
                ("csrf_token", token.as_str()),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.header("set-cookie").is_some());
}

#[tokio::test]
async fn test_masked_tokens_differ_but_verify() {
    let client = TestClient::new();
    let first = client.get("/user/signup").await.csrf_token().unwrap();
    let second = client.get("/user/signup").await.csrf_token().unwrap();
    assert_ne!(first, second);

    let resp = client
        .post_form(
            "/user/signup",
            &[
                ("name", "Carol"),
                ("email", "carol@example.com"),
                ("password", "validpassword"),
                ("csrf_token", first.as_str()),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(client.users.len(), 1);
}

#[tokio::test]
async fn test_safe_methods_skip_the_check() {
    let client = TestClient::new();
    let resp = client.get("/user/signup").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(client.cookie("csrf_token").is_some());

    let cookie = client.cookie("csrf_token");
    client.get("/").await;
    assert_eq!(client.cookie("csrf_token"), cookie);
}
