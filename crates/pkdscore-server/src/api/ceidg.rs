//! Registry longevity scores per section.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pkdscore_db::CeidgRow;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CeidgScoreItem {
    pub pkd_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub wskaznik: Decimal,
    pub utworzono: DateTime<Utc>,
}

impl From<CeidgRow> for CeidgScoreItem {
    fn from(row: CeidgRow) -> Self {
        Self {
            pkd_id: row.pkd_id,
            wskaznik: row.wskaznik,
            utworzono: row.utworzono,
        }
    }
}

pub(super) async fn list_scores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<CeidgScoreItem>>, ApiError> {
    let rows = pkdscore_db::latest_ceidg_scores(&state.pool)
        .await
        .map_err(|e| map_db_error(&req_id, &e))?;
    if rows.is_empty() {
        return Err(ApiError::not_found("Brak wyników CEIDG w bazie"));
    }

    Ok(Json(rows.into_iter().map(CeidgScoreItem::from).collect()))
}

pub(super) async fn sector_score(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(code): Path<String>,
) -> Result<Json<CeidgScoreItem>, ApiError> {
    let code = pkdscore_core::normalize_code(&code);
    let row = pkdscore_db::latest_ceidg_for_code(&state.pool, &code)
        .await
        .map_err(|e| map_db_error(&req_id, &e))?
        .ok_or_else(|| ApiError::sector_not_found(&code))?;

    Ok(Json(CeidgScoreItem::from(row)))
}
