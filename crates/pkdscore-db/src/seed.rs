use pkdscore_core::{Section, TagConfig};
use sqlx::PgPool;

use crate::DbError;

/// Upsert the PKD section registry.
///
/// Returns the number of sections processed. Runs in a single transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_sections(pool: &PgPool, sections: &[Section]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    for section in sections {
        sqlx::query(
            "INSERT INTO pkd (pkd, nazwa) VALUES ($1, $2) \
             ON CONFLICT (pkd) DO UPDATE SET nazwa = EXCLUDED.nazwa",
        )
        .bind(section.code)
        .bind(section.name)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(sections.len())
}

/// Upsert the monitored tags from config.
///
/// An existing tag keeps its id and only has its section updated, so stored
/// posts stay attached to it. Runs in a single transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails, including a tag
/// pointing at a section missing from the `pkd` table.
pub async fn seed_tags(pool: &PgPool, tags: &[TagConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    for tag in tags {
        sqlx::query(
            "INSERT INTO tag (tag_name, pkd) VALUES ($1, $2) \
             ON CONFLICT (tag_name) DO UPDATE SET pkd = EXCLUDED.pkd",
        )
        .bind(&tag.name)
        .bind(&tag.pkd)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(tags.len())
}
