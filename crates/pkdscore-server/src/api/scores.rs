//! Blended sector scores, computed per request from every source table.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use pkdscore_core::BlendedScore;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

pub(super) async fn list_scores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<BlendedScore>>, ApiError> {
    let inputs = pkdscore_db::load_blend_inputs(&state.pool)
        .await
        .map_err(|e| map_db_error(&req_id, &e))?;

    let scores = pkdscore_core::blend(&inputs);
    if scores.is_empty() {
        return Err(ApiError::not_found("Brak wyników dla żadnego sektora"));
    }
    Ok(Json(scores))
}

pub(super) async fn sector_score(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(code): Path<String>,
) -> Result<Json<BlendedScore>, ApiError> {
    let code = pkdscore_core::normalize_code(&code);
    let inputs = pkdscore_db::load_blend_inputs(&state.pool)
        .await
        .map_err(|e| map_db_error(&req_id, &e))?;

    pkdscore_core::blend_one(&inputs, &code)
        .map(Json)
        .ok_or_else(|| ApiError::sector_not_found(&code))
}
