use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CategoryItem {
    pub pkd: String,
    pub nazwa: String,
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<CategoryItem>>, ApiError> {
    let rows = pkdscore_db::list_pkd(&state.pool)
        .await
        .map_err(|e| map_db_error(&req_id, &e))?;

    if rows.is_empty() {
        return Err(ApiError::not_found("Nie znaleziono kategorii"));
    }

    Ok(Json(
        rows.into_iter()
            .map(|row| CategoryItem {
                pkd: row.pkd,
                nazwa: row.nazwa,
            })
            .collect(),
    ))
}
