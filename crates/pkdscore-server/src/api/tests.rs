use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use chrono::{NaiveDate, TimeZone, Utc};
use pkdscore_db::NewSection;
use rust_decimal::Decimal;
use tower::ServiceExt;

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None, 5), 5);
    assert_eq!(normalize_limit(None, 50), 50);
    assert_eq!(normalize_limit(Some(0), 5), 1);
    assert_eq!(normalize_limit(Some(1_000), 5), 200);
    assert_eq!(normalize_limit(Some(25), 5), 25);
}

#[test]
fn api_error_not_found_maps_to_404() {
    let response = ApiError::sector_not_found("Q").into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn api_error_unknown_code_maps_to_500() {
    let response = ApiError::new("internal_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn api_error_serializes_detail_only() {
    let json = serde_json::to_value(ApiError::not_found("Brak raportów w bazie")).unwrap();
    assert_eq!(json, serde_json::json!({"detail": "Brak raportów w bazie"}));
}

// -------------------------------------------------------------------------
// Route integration tests (with DB)
// -------------------------------------------------------------------------

fn section(code: &str, name: &str, score: i32) -> NewSection {
    NewSection {
        section_code: code.to_string(),
        section_name: name.to_string(),
        safety_score: score,
        rating: "B".to_string(),
        median_margin: Some(Decimal::new(8, 2)),
        median_roe: None,
        median_pe: Some(Decimal::new(125, 1)),
        median_dividend_yield: Some(Decimal::new(45, 3)),
        companies_count: 4,
        total_cap_pln: 2_500_000_000,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

async fn get_json(pool: sqlx::PgPool, uri: &str) -> (StatusCode, serde_json::Value) {
    let app = build_app(AppState { pool });
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

#[sqlx::test(migrations = "../../migrations")]
async fn blended_score_for_k_averages_market_and_gus(pool: sqlx::PgPool) {
    pkdscore_db::insert_report(&pool, date(2024, 1, 1), &[section("K", "Finanse", 70)])
        .await
        .expect("insert report");
    pkdscore_db::replace_gus_scores(&pool, &[("K".to_string(), Decimal::new(500, 1))])
        .await
        .expect("insert gus");

    let (status, json) = get_json(pool, "/scores/K").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["section_code"], "K");
    assert_eq!(json["section_name"], "Finanse");
    assert!((json["final_score"].as_f64().unwrap() - 60.0).abs() < 0.01);
    assert_eq!(json["market_score"], 70);
    assert_eq!(json["gus_score"].as_f64(), Some(50.0));
    assert!(json["ceidg_score"].is_null());
    assert!(json["social_score"].is_null());
}

#[sqlx::test(migrations = "../../migrations")]
async fn blended_scores_are_sorted_best_first(pool: sqlx::PgPool) {
    pkdscore_db::replace_gus_scores(
        &pool,
        &[
            ("C".to_string(), Decimal::new(20, 0)),
            ("F".to_string(), Decimal::new(90, 0)),
        ],
    )
    .await
    .expect("insert gus");

    let (status, json) = get_json(pool, "/scores").await;

    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = json
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|s| s["section_code"].as_str())
        .collect();
    assert_eq!(codes, vec!["F", "C"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn blended_score_for_absent_sector_is_404(pool: sqlx::PgPool) {
    let (status, json) = get_json(pool, "/scores/q").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "Nie znaleziono danych dla sektora Q");
}

#[sqlx::test(migrations = "../../migrations")]
async fn latest_report_is_404_without_reports(pool: sqlx::PgPool) {
    let (status, json) = get_json(pool, "/markets/reports/latest").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "Brak raportów w bazie");
}

#[sqlx::test(migrations = "../../migrations")]
async fn latest_report_includes_its_sections(pool: sqlx::PgPool) {
    pkdscore_db::insert_report(&pool, date(2024, 1, 1), &[section("K", "Finanse", 40)])
        .await
        .expect("older report");
    pkdscore_db::insert_report(
        &pool,
        date(2024, 2, 1),
        &[section("C", "Przemysł", 55), section("K", "Finanse", 81)],
    )
    .await
    .expect("newer report");

    let (status, json) = get_json(pool, "/markets/reports/latest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["date"], "2024-02-01");
    let sections = json["sections"].as_array().expect("sections");
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["section_code"], "K");
    assert_eq!(sections[0]["safety_score"], 81);
    assert_eq!(sections[0]["median_margin"].as_f64(), Some(0.08));
    assert!(sections[0]["median_roe"].is_null());
    assert_eq!(sections[0]["median_divident_yield"].as_f64(), Some(0.045));
    assert!(sections[0].get("median_dividend_yield").is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn report_history_groups_sections_per_report(pool: sqlx::PgPool) {
    for (day, score) in [(1, 40), (2, 50), (3, 60)] {
        pkdscore_db::insert_report(&pool, date(2024, 3, day), &[section("K", "Finanse", score)])
            .await
            .expect("insert report");
    }

    let (status, json) = get_json(pool, "/markets/reports/history?limit=2").await;

    assert_eq!(status, StatusCode::OK);
    let reports = json.as_array().expect("array");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["date"], "2024-03-03");
    assert_eq!(reports[0]["sections"][0]["safety_score"], 60);
    assert_eq!(reports[1]["date"], "2024-03-02");
    assert_eq!(reports[1]["sections"][0]["safety_score"], 50);
}

#[sqlx::test(migrations = "../../migrations")]
async fn market_routes_upper_case_the_sector_code(pool: sqlx::PgPool) {
    pkdscore_db::insert_report(&pool, date(2024, 1, 1), &[section("K", "Finanse", 40)])
        .await
        .expect("older report");
    pkdscore_db::insert_report(&pool, date(2024, 2, 1), &[section("K", "Finanse", 65)])
        .await
        .expect("newer report");

    let (status, json) = get_json(pool.clone(), "/markets/scores/k").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["safety_score"], 65);

    let (status, json) = get_json(pool, "/markets/sectors/k").await;
    assert_eq!(status, StatusCode::OK);
    let history = json.as_array().expect("array");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["report_date"], "2024-02-01");
    assert_eq!(history[0]["section_code"], "K");
    assert_eq!(history[1]["safety_score"], 40);
}

#[sqlx::test(migrations = "../../migrations")]
async fn top_sectors_and_simple_scores_use_latest_report(pool: sqlx::PgPool) {
    pkdscore_db::insert_report(
        &pool,
        date(2024, 2, 1),
        &[
            section("C", "Przemysł", 55),
            section("K", "Finanse", 81),
            section("J", "IT", 62),
        ],
    )
    .await
    .expect("insert report");

    let (status, json) = get_json(pool.clone(), "/markets/sectors/top?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = json
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|s| s["section_code"].as_str())
        .collect();
    assert_eq!(codes, vec!["K", "J"]);

    let (status, json) = get_json(pool, "/markets/scores/latest").await;
    assert_eq!(status, StatusCode::OK);
    let first = &json.as_array().expect("array")[0];
    assert_eq!(first["section_code"], "K");
    assert_eq!(first["rating"], "B");
    assert!(first.get("median_pe").is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn market_score_for_unknown_sector_is_404(pool: sqlx::PgPool) {
    let (status, json) = get_json(pool, "/markets/scores/K").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "Nie znaleziono danych dla sektora K");
}

#[sqlx::test(migrations = "../../migrations")]
async fn categories_list_all_sections_in_order(pool: sqlx::PgPool) {
    let (status, json) = get_json(pool, "/categories").await;

    assert_eq!(status, StatusCode::OK);
    let items = json.as_array().expect("array");
    assert_eq!(items.len(), 21);
    assert_eq!(items[0]["pkd"], "A");
    assert_eq!(items[20]["pkd"], "U");
}

#[sqlx::test(migrations = "../../migrations")]
async fn categories_404_when_registry_is_empty(pool: sqlx::PgPool) {
    sqlx::query("DELETE FROM pkd")
        .execute(&pool)
        .await
        .expect("clear registry");

    let (status, json) = get_json(pool, "/categories").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "Nie znaleziono kategorii");
}

#[sqlx::test(migrations = "../../migrations")]
async fn ceidg_routes_return_latest_row_per_sector(pool: sqlx::PgPool) {
    let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let newer = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    pkdscore_db::insert_ceidg_scores(&pool, &[("G".to_string(), Decimal::new(10, 0))], older)
        .await
        .expect("older batch");
    pkdscore_db::insert_ceidg_scores(&pool, &[("G".to_string(), Decimal::new(7525, 2))], newer)
        .await
        .expect("newer batch");

    let (status, json) = get_json(pool.clone(), "/ceidg/scores").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["wskaznik"].as_f64(), Some(75.25));

    let (status, json) = get_json(pool.clone(), "/ceidg/scores/g").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pkd_id"], "G");

    let (status, json) = get_json(pool, "/ceidg/scores/A").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "Nie znaleziono danych dla sektora A");
}

#[sqlx::test(migrations = "../../migrations")]
async fn social_routes_filter_by_tag(pool: sqlx::PgPool) {
    let energy: i32 =
        sqlx::query_scalar("INSERT INTO tag (tag_name, pkd) VALUES ('energia', 'D') RETURNING id")
            .fetch_one(&pool)
            .await
            .expect("tag");
    let banks: i32 =
        sqlx::query_scalar("INSERT INTO tag (tag_name, pkd) VALUES ('banki', 'K') RETURNING id")
            .fetch_one(&pool)
            .await
            .expect("tag");

    pkdscore_db::insert_youtube_comment(&pool, "yt-1", energy, "Świetnie", Some(Decimal::new(75, 0)))
        .await
        .expect("comment");
    pkdscore_db::insert_youtube_comment(&pool, "yt-2", banks, "Kryzys", None)
        .await
        .expect("comment");
    pkdscore_db::insert_wykop_post(&pool, 900, banks, "Banki zarabiają", None)
        .await
        .expect("post");

    let uri = format!("/komentarz_youtube?tag_id={energy}");
    let (status, json) = get_json(pool.clone(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    let comments = json.as_array().expect("array");
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["youtube_id"], "yt-1");
    assert_eq!(comments[0]["emocje"].as_f64(), Some(75.0));

    let (status, json) = get_json(pool, "/post_wykop").await;
    assert_eq!(status, StatusCode::OK);
    let posts = json.as_array().expect("array");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], 900);
    assert!(posts[0]["emocje"].is_null());
}

#[sqlx::test(migrations = "../../migrations")]
async fn unfiltered_lists_are_404_on_an_empty_database(pool: sqlx::PgPool) {
    let cases = [
        ("/scores", "Brak wyników dla żadnego sektora"),
        ("/ceidg/scores", "Brak wyników CEIDG w bazie"),
        ("/komentarz_youtube", "Nie znaleziono komentarzy YouTube"),
        ("/post_wykop", "Nie znaleziono postów Wykop"),
    ];

    for (uri, detail) in cases {
        let (status, json) = get_json(pool.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(json["detail"], detail, "{uri}");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn social_list_is_404_when_tag_has_no_posts(pool: sqlx::PgPool) {
    let tag: i32 =
        sqlx::query_scalar("INSERT INTO tag (tag_name, pkd) VALUES ('rolnictwo', 'A') RETURNING id")
            .fetch_one(&pool)
            .await
            .expect("tag");

    let uri = format!("/komentarz_youtube?tag_id={tag}");
    let (status, _) = get_json(pool.clone(), &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/post_wykop?tag_id={tag}");
    let (status, _) = get_json(pool, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_reports_database_ok_and_echoes_request_id(pool: sqlx::PgPool) {
    let app = build_app(AppState { pool });
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-123")
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "ok");
}
