//! Database operations for the `pkd` section registry.

use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PkdRow {
    pub pkd: String,
    pub nazwa: String,
}

/// List all PKD sections ordered by code.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_pkd(pool: &PgPool) -> Result<Vec<PkdRow>, DbError> {
    let rows = sqlx::query_as::<_, PkdRow>("SELECT pkd, nazwa FROM pkd ORDER BY pkd")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
