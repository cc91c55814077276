mod categories;
mod ceidg;
mod markets;
mod scores;
mod social;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// Error response. Serializes as `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub code: &'static str,
    pub detail: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ApiError {
    pub fn new(code: &'static str, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new("not_found", detail)
    }

    /// 404 for a sector code with no data.
    pub fn sector_not_found(code: &str) -> Self {
        Self::not_found(format!("Nie znaleziono danych dla sektora {code}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Apply a per-route default and keep `limit` within `1..=200`.
pub(super) fn normalize_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, 200)
}

pub(super) fn map_db_error(req_id: &RequestId, error: &pkdscore_db::DbError) -> ApiError {
    tracing::error!(request_id = %req_id.0, error = %error, "database query failed");
    ApiError::new("internal_error", "Błąd zapytania do bazy danych")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/markets/reports/latest", get(markets::latest_report))
        .route("/markets/reports/history", get(markets::reports_history))
        .route("/markets/sectors/top", get(markets::top_sectors))
        .route("/markets/sectors/{code}", get(markets::sector_history))
        .route("/markets/scores/latest", get(markets::latest_scores))
        .route("/markets/scores/{code}", get(markets::sector_score))
        .route("/categories", get(categories::list_categories))
        .route("/ceidg/scores", get(ceidg::list_scores))
        .route("/ceidg/scores/{code}", get(ceidg::sector_score))
        .route("/scores", get(scores::list_scores))
        .route("/scores/{code}", get(scores::sector_score))
        .route("/komentarz_youtube", get(social::list_youtube_comments))
        .route("/post_wykop", get(social::list_wykop_posts))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(api_router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match pkdscore_db::ping(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests;
