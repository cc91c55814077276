//! Stored social posts.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, AppState};

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub(super) struct SocialQuery {
    pub tag_id: Option<i32>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct YoutubeCommentItem {
    pub id: i64,
    pub youtube_id: String,
    pub tag_id: i32,
    pub komentarz: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub emocje: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct WykopPostItem {
    pub id: i64,
    pub tag_id: i32,
    pub post: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub emocje: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

pub(super) async fn list_youtube_comments(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SocialQuery>,
) -> Result<Json<Vec<YoutubeCommentItem>>, ApiError> {
    let rows = pkdscore_db::list_youtube_comments(
        &state.pool,
        query.tag_id,
        normalize_limit(query.limit, DEFAULT_LIMIT),
    )
    .await
    .map_err(|e| map_db_error(&req_id, &e))?;
    if rows.is_empty() {
        return Err(ApiError::not_found("Nie znaleziono komentarzy YouTube"));
    }

    let data = rows
        .into_iter()
        .map(|row| YoutubeCommentItem {
            id: row.id,
            youtube_id: row.youtube_id,
            tag_id: row.tag_id,
            komentarz: row.komentarz,
            emocje: row.emocje,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(data))
}

pub(super) async fn list_wykop_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SocialQuery>,
) -> Result<Json<Vec<WykopPostItem>>, ApiError> {
    let rows = pkdscore_db::list_wykop_posts(
        &state.pool,
        query.tag_id,
        normalize_limit(query.limit, DEFAULT_LIMIT),
    )
    .await
    .map_err(|e| map_db_error(&req_id, &e))?;
    if rows.is_empty() {
        return Err(ApiError::not_found("Nie znaleziono postów Wykop"));
    }

    let data = rows
        .into_iter()
        .map(|row| WykopPostItem {
            id: row.id,
            tag_id: row.tag_id,
            post: row.post,
            emocje: row.emocje,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(data))
}
