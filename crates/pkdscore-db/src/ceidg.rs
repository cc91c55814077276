//! Database operations for the append-only `ceidg` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CeidgRow {
    pub id: i64,
    pub pkd_id: String,
    pub wskaznik: Decimal,
    pub utworzono: DateTime<Utc>,
}

/// Append one batch of section scores stamped with `utworzono`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is written then.
pub async fn insert_ceidg_scores(
    pool: &PgPool,
    scores: &[(String, Decimal)],
    utworzono: DateTime<Utc>,
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    for (pkd_id, wskaznik) in scores {
        sqlx::query("INSERT INTO ceidg (pkd_id, wskaznik, utworzono) VALUES ($1, $2, $3)")
            .bind(pkd_id)
            .bind(wskaznik)
            .bind(utworzono)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(scores.len())
}

/// The newest row for every section, best score first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_ceidg_scores(pool: &PgPool) -> Result<Vec<CeidgRow>, DbError> {
    let rows = sqlx::query_as::<_, CeidgRow>(
        "SELECT * FROM ( \
             SELECT DISTINCT ON (pkd_id) id, pkd_id, wskaznik, utworzono \
             FROM ceidg \
             ORDER BY pkd_id, utworzono DESC, id DESC \
         ) latest \
         ORDER BY wskaznik DESC, pkd_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The newest row for one section, or `None` if it was never scored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_ceidg_for_code(pool: &PgPool, code: &str) -> Result<Option<CeidgRow>, DbError> {
    let row = sqlx::query_as::<_, CeidgRow>(
        "SELECT id, pkd_id, wskaznik, utworzono \
         FROM ceidg \
         WHERE pkd_id = $1 \
         ORDER BY utworzono DESC, id DESC \
         LIMIT 1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
