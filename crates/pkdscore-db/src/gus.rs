//! Database operations for the `gus` table.
//!
//! The table holds one row per section and is rewritten in full by every
//! GUS collection run.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GusRow {
    pub id: i32,
    pub pkd: String,
    pub wskaznik: Decimal,
}

/// Replace the whole table with `scores` in one transaction.
///
/// Ids restart from 1. On failure the previous contents are kept.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the truncate or any insert fails.
pub async fn replace_gus_scores(pool: &PgPool, scores: &[(String, Decimal)]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("TRUNCATE TABLE gus RESTART IDENTITY")
        .execute(&mut *tx)
        .await?;

    for (pkd, wskaznik) in scores {
        sqlx::query("INSERT INTO gus (pkd, wskaznik) VALUES ($1, $2)")
            .bind(pkd)
            .bind(wskaznik)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(scores.len())
}

/// All GUS rows, best score first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_gus_scores(pool: &PgPool) -> Result<Vec<GusRow>, DbError> {
    let rows = sqlx::query_as::<_, GusRow>(
        "SELECT id, pkd, wskaznik FROM gus ORDER BY wskaznik DESC, pkd",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
