//! Integration tests for `WykopClient` using wiremock HTTP mocks.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pkdscore_sentiment::{SentimentError, StreamBudget, WykopClient};

async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(body_json(json!({"data": {"key": "app-key", "secret": "app-secret"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"token": "tok-1", "refresh_token": "r-1"}
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn login(server: &MockServer) -> WykopClient {
    WykopClient::login_with_base_url("app-key", "app-secret", 5, "pkdscore-test/0.1", &server.uri())
        .await
        .expect("login should succeed")
}

#[tokio::test]
async fn stream_uses_clean_tag_and_bearer_token() {
    let server = MockServer::start().await;
    mount_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/tags/energiasloneczna/stream"))
        .and(query_param("page", "2"))
        .and(query_param("sort", "all"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 101, "content": "Panele to dobra inwestycja"},
                {"id": 102, "content": "", "source": {"label": "Rekordowa produkcja"}},
                {"id": 103, "content": null}
            ],
            "pagination": {"per_page": 25}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = login(&server).await;
    let entries = client
        .tag_stream("Energia Słoneczna", 2)
        .await
        .expect("stream should parse");

    let texts: Vec<(Option<i64>, Option<&str>)> =
        entries.iter().map(|e| (e.id, e.text())).collect();
    assert_eq!(
        texts,
        vec![
            (Some(101), Some("Panele to dobra inwestycja")),
            (Some(102), Some("Rekordowa produkcja")),
            (Some(103), None),
        ]
    );
}

#[tokio::test]
async fn rejected_credentials_fail_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let err = WykopClient::login_with_base_url("bad", "bad", 5, "pkdscore-test/0.1", &server.uri())
        .await
        .err()
        .expect("login should fail");
    assert!(
        matches!(err, SentimentError::WykopAuth(ref msg) if msg.contains("invalid key")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn empty_pages_end_collection() {
    let server = MockServer::start().await;
    mount_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/tags/gielda/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(3)
        .mount(&server)
        .await;

    let client = login(&server).await;
    let mut budget = StreamBudget::default();
    while !budget.exhausted() {
        let entries = client
            .tag_stream("giełda", budget.next_page())
            .await
            .expect("stream should parse");
        budget.record_page(entries.len());
    }
    assert_eq!(budget.stored(), 0);
}

#[tokio::test]
async fn stream_error_status_is_reported() {
    let server = MockServer::start().await;
    mount_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/tags/banki/stream"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = login(&server).await;
    let err = client.tag_stream("banki", 1).await.expect_err("404 should fail");
    assert!(matches!(err, SentimentError::UnexpectedStatus { status: 404, .. }));
}
