use crate::common::{create_test_config, spawn_server};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread")]
async fn test_server_smoke() {
    let mut config = (*create_test_config()).clone();
    config.max_body_size = 1024;
    let (port, _handle) = spawn_server(Arc::new(config)).await;
    let base = format!("http://127.0.0.1:{port}");
    let client = reqwest::Client::new();

    let ping = client.get(format!("{base}/ping")).send().await.unwrap();
    assert_eq!(ping.status(), 200);
    assert_eq!(ping.headers()["x-frame-options"], "deny");
    assert_eq!(ping.text().await.unwrap(), "OK");

    let home = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(home.status(), 200);
    assert!(home.headers().get("set-cookie").is_some());
    assert!(home.text().await.unwrap().contains("Latest Snippets"));

    let missing = client.get(format!("{base}/nope")).send().await.unwrap();
    assert_eq!(missing.status(), 404);

    let oversized = client
        .post(format!("{base}/user/login"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("a".repeat(4096))
        .send()
        .await
        .unwrap();
    assert_eq!(oversized.status(), 413);
}
