use crate::common::TestClient;
use http::StatusCode;
use snipbox::SnippetStore;

#[tokio::test]
async fn test_view_invalid_ids_are_not_found() {
    let client = TestClient::new();
    for path in ["/snippet/view/0", "/snippet/view/-3", "/snippet/view/abc", "/snippet/view/1"] {
        let resp = client.get(path).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(resp.body, "Not Found\n");
    }
}

#[tokio::test]
async fn test_view_renders_escaped_snippet() {
    let client = TestClient::new();
    let id = client
        .snippets
        .insert("<b>Bold</b>", "line one\nline two", 7)
        .await
        .unwrap();

    let resp = client.get(&format!("/snippet/view/{id}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("&lt;b&gt;Bold&lt;/b&gt;"));
    assert!(!resp.body.contains("<b>Bold</b>"));
    assert!(resp.body.contains("line one\nline two"));
    assert!(resp.body.contains(&format!("#{id}")));
}

#[tokio::test]
async fn test_anonymous_create_redirects_without_insert() {
    let client = TestClient::new();
    let token = client.get("/user/login").await.csrf_token().unwrap();

    let resp = client
        .post_form(
            "/snippet/create",
            &[
                ("title", ""),
                ("content", "hi"),
                ("expires", "7"),
                ("csrf_token", token.as_str()),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some("/user/login"));
    assert!(client.snippets.is_empty());
}

#[tokio::test]
async fn test_create_validation_errors() {
    let client = TestClient::logged_in().await;
    let long_title = "x".repeat(101);

    let resp = client
        .submit(
            "/snippet/create",
            "/snippet/create",
            &[("title", long_title.as_str()), ("content", ""), ("expires", "30")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("This field cannot be more than 100 characters long"));
    assert!(resp.body.contains("This field cannot be blank"));
    assert!(resp.body.contains("This field must equal 1, 7 or 365"));
    assert!(resp.body.contains(&long_title));
    assert!(client.snippets.is_empty());
}

#[tokio::test]
async fn test_create_non_numeric_expires_is_bad_request() {
    let client = TestClient::logged_in().await;
    let resp = client
        .submit(
            "/snippet/create",
            "/snippet/create",
            &[("title", "Title"), ("content", "Body"), ("expires", "soon")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(client.snippets.is_empty());
}

#[tokio::test]
async fn test_create_success() {
    let client = TestClient::logged_in().await;
    let resp = client
        .submit(
            "/snippet/create",
            "/snippet/create",
            &[
                ("title", "O snail"),
                ("content", "Climb Mount Fuji,\nBut slowly, slowly!"),
                ("expires", "7"),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some("/snippet/view/1"));
    assert_eq!(client.snippets.len(), 1);

    let page = client.get("/snippet/view/1").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Snippet successfully created!"));
    assert!(page.body.contains("O snail"));

    let again = client.get("/snippet/view/1").await;
    assert!(!again.body.contains("Snippet successfully created!"));
}

#[tokio::test]
async fn test_create_form_defaults_to_one_year() {
    let client = TestClient::logged_in().await;
    let page = client.get("/snippet/create").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("value='365' checked"));
}

#[tokio::test]
async fn test_home_lists_latest() {
    let client = TestClient::new();
    let empty = client.get("/").await;
    assert!(empty.body.contains("There's nothing to see here... yet!"));

    for i in 1..=12 {
        client
            .snippets
            .insert(&format!("snippet {i}"), "body", 1)
            .await
            .unwrap();
    }

    let home = client.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("<a href='/snippet/view/12'>snippet 12</a>"));
    assert!(home.body.contains("<a href='/snippet/view/3'>snippet 3</a>"));
    assert!(!home.body.contains("/snippet/view/2'"));
    assert!(home.body.find("snippet 12") < home.body.find("snippet 11"));
}
