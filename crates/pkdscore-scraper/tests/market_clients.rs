//! Integration tests for `BankierClient` and `YahooClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pkdscore_scraper::{BankierClient, ScraperError, YahooClient};

// ---------------------------------------------------------------------------
// Bankier
// ---------------------------------------------------------------------------

fn bankier(base_url: &str) -> BankierClient {
    BankierClient::with_base_url(5, "pkdscore-test/0.1", base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn bankier_listing_yields_slugs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gielda/notowania/akcje"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<table><tr><th>Walor</th></tr>\
             <tr><td><a>PKOBP Bank</a></td><td>50</td></tr>\
             <tr><td><a>KGHM</a></td><td>120</td></tr></table>",
        ))
        .mount(&server)
        .await;

    let slugs = bankier(&server.uri())
        .list_company_slugs()
        .await
        .expect("listing should parse");
    assert_eq!(slugs, vec!["PKOBP", "KGHM"]);
}

#[tokio::test]
async fn bankier_resolves_warsaw_symbol() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gielda/notowania/akcje/KGHM/podstawowe-dane"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<table><tr><td>ISIN</td><td>PLKGHM000017</td></tr>\
             <tr><td>Ticker GPW</td><td>KGH</td></tr></table>",
        ))
        .mount(&server)
        .await;

    let symbol = bankier(&server.uri())
        .resolve_symbol("KGHM")
        .await
        .expect("request ok");
    assert_eq!(symbol.as_deref(), Some("KGH.WA"));
}

#[tokio::test]
async fn bankier_page_without_ticker_resolves_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gielda/notowania/akcje/FUND/podstawowe-dane"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>brak danych</p>"))
        .mount(&server)
        .await;

    let symbol = bankier(&server.uri())
        .resolve_symbol("FUND")
        .await
        .expect("request ok");
    assert!(symbol.is_none());
}

// ---------------------------------------------------------------------------
// Yahoo
// ---------------------------------------------------------------------------

async fn mount_handshake(server: &MockServer, expected_crumb_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/cookie"))
        .respond_with(
            ResponseTemplate::new(404).insert_header("set-cookie", "A3=d=session; Path=/; Secure"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/test/getcrumb"))
        .and(header("cookie", "A3=d=session"))
        .respond_with(ResponseTemplate::new(200).set_body_string("crumb-42"))
        .expect(expected_crumb_calls)
        .mount(server)
        .await;
}

fn yahoo(server: &MockServer) -> YahooClient {
    YahooClient::with_base_urls(5, &format!("{}/cookie", server.uri()), &server.uri())
        .expect("client construction should not fail")
}

#[tokio::test]
async fn yahoo_fetches_fundamentals_and_reuses_crumb() {
    let server = MockServer::start().await;
    mount_handshake(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/PKO.WA"))
        .and(query_param("crumb", "crumb-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteSummary": {
                "result": [{
                    "price": {"symbol": "PKO.WA", "shortName": "PKO BP", "marketCap": {"raw": 6.0e10}},
                    "summaryProfile": {"sector": "Financial Services", "industry": "Banks - Regional"},
                    "summaryDetail": {"trailingPE": {"raw": 9.0}, "dividendYield": {"raw": 0.05}},
                    "financialData": {"totalRevenue": {"raw": 3.0e10}, "returnOnEquity": {"raw": 0.2},
                                      "profitMargins": {"raw": 0.35}},
                    "defaultKeyStatistics": {"priceToBook": {"raw": 1.4}}
                }],
                "error": null
            }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = yahoo(&server);
    let first = client
        .fundamentals("PKO.WA")
        .await
        .expect("request ok")
        .expect("company known");
    let second = client
        .fundamentals("PKO.WA")
        .await
        .expect("request ok")
        .expect("company known");

    assert_eq!(first, second);
    assert_eq!(first.industry.as_deref(), Some("Banks - Regional"));
    assert_eq!(first.pe_trailing, Some(9.0));
    assert_eq!(first.revenue, Some(3.0e10));
}

#[tokio::test]
async fn yahoo_unknown_symbol_is_none() {
    let server = MockServer::start().await;
    mount_handshake(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/NOPE.WA"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "quoteSummary": {"result": null, "error": {"code": "Not Found"}}
        })))
        .mount(&server)
        .await;

    let result = yahoo(&server)
        .fundamentals("NOPE.WA")
        .await
        .expect("404 is not an error");
    assert!(result.is_none());
}

#[tokio::test]
async fn yahoo_unauthorized_drops_crumb() {
    let server = MockServer::start().await;
    mount_handshake(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/PKO.WA"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = yahoo(&server);
    for _ in 0..2 {
        let err = client
            .fundamentals("PKO.WA")
            .await
            .expect_err("401 must fail");
        assert!(matches!(err, ScraperError::Auth { .. }));
    }
}

#[tokio::test]
async fn yahoo_without_cookie_fails_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cookie"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = yahoo(&server)
        .fundamentals("PKO.WA")
        .await
        .expect_err("no cookie must fail");
    assert!(matches!(err, ScraperError::Auth { .. }));
}
