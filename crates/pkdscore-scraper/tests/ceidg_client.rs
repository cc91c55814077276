//! Integration tests for `CeidgClient` using wiremock HTTP mocks.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pkdscore_scraper::{CeidgClient, FirmRecord, ScraperError};

fn test_client(base_url: &str) -> CeidgClient {
    CeidgClient::with_base_url("jwt-token", 5, "pkdscore-test/0.1", base_url)
        .expect("client construction should not fail")
}

fn since() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 6, 1).expect("valid date")
}

#[tokio::test]
async fn search_page_sends_filters_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/firmy"))
        .and(query_param("limit", "25"))
        .and(query_param("page", "3"))
        .and(query_param("dataod", "2020-06-01"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1234,
            "firmy": [{"id": "a1", "nazwa": "X"}, {"id": "b2", "nazwa": "Y"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = test_client(&server.uri())
        .search_page(since(), 3)
        .await
        .expect("page should parse");

    assert_eq!(page.count, 1234);
    let ids: Vec<&str> = page.firmy.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "b2"]);
}

#[tokio::test]
async fn search_page_no_content_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/firmy"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let page = test_client(&server.uri())
        .search_page(since(), 0)
        .await
        .expect("204 is not an error");
    assert_eq!(page.count, 0);
    assert!(page.firmy.is_empty());
}

#[tokio::test]
async fn search_page_rate_limit_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/firmy"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search_page(since(), 0)
        .await
        .expect_err("429 must fail");
    assert!(matches!(
        err,
        ScraperError::RateLimited {
            retry_after_secs: 30,
            ..
        }
    ));
}

#[tokio::test]
async fn firm_details_flattens_first_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/firma/abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firma": [{
                "id": "abc-123",
                "nazwa": "Nowak Budownictwo",
                "dataRozpoczecia": "2019-04-01",
                "dataZakonczenia": "2024-01-31",
                "status": "WYKRESLONY",
                "wlasciciel": {"imie": "Anna", "nazwisko": "Nowak", "nip": "111", "regon": "222"},
                "adresDzialalnosci": {"ulica": "Długa", "miasto": "Gdańsk", "powiat": "Gdańsk",
                                      "wojewodztwo": "POMORSKIE", "kod": "80-001"},
                "pkdGlowny": {"kod": "4120Z", "nazwa": "Roboty budowlane"}
            }]
        })))
        .mount(&server)
        .await;

    let detail = test_client(&server.uri())
        .firm_details("abc-123")
        .await
        .expect("request ok")
        .expect("firm present");
    let record = FirmRecord::from(detail);

    assert_eq!(record.kod_pkd_glowny, "41");
    assert_eq!(record.status, "WYKRESLONY");
    assert_eq!(record.wojewodztwo_dzialalnosc, "POMORSKIE");
    assert_eq!(
        record.lifespan().ended,
        NaiveDate::from_ymd_opt(2024, 1, 31)
    );
}

#[tokio::test]
async fn firm_details_empty_list_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/firma/zzz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"firma": []})))
        .mount(&server)
        .await;

    let detail = test_client(&server.uri())
        .firm_details("zzz")
        .await
        .expect("request ok");
    assert!(detail.is_none());
}

#[tokio::test]
async fn firm_details_not_found_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/firma/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .firm_details("missing")
        .await
        .expect_err("404 must fail");
    assert!(matches!(err, ScraperError::NotFound { .. }));
}
