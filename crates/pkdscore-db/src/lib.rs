//! Postgres storage for pkdscore: the pool, embedded migrations, and typed
//! queries for every source table.

use std::collections::HashSet;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

pub mod ceidg;
pub mod gus;
pub mod pkd;
pub mod reports;
pub mod scores;
pub mod seed;
pub mod social;

pub use ceidg::{insert_ceidg_scores, latest_ceidg_for_code, latest_ceidg_scores, CeidgRow};
pub use gus::{list_gus_scores, replace_gus_scores, GusRow};
pub use pkd::{list_pkd, PkdRow};
pub use reports::{
    insert_report, latest_report, latest_section_for_code, latest_sections, list_reports,
    section_history, sections_for_reports, top_sections, NewSection, ReportRow, SectionHistoryRow,
    SectionRow,
};
pub use scores::load_blend_inputs;
pub use seed::{seed_sections, seed_tags};
pub use social::{
    insert_wykop_post, insert_youtube_comment, list_tags, list_unscored_wykop_posts,
    list_unscored_youtube_comments, list_wykop_posts, list_youtube_comments,
    sector_sentiment_wykop, sector_sentiment_youtube, set_wykop_emocje, set_youtube_emocje,
    SectorSentimentRow, TagRow, WykopPostRow, YoutubeCommentRow,
};

// Resolves to <workspace-root>/migrations/.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Pool sizing, taken from [`pkdscore_core::AppConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &pkdscore_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

/// Open a pool against `database_url`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if no connection can be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply pending migrations and return how many were applied.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DbError> {
    let applied = applied_versions(pool).await;
    MIGRATOR.run(pool).await?;

    Ok(MIGRATOR
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .count())
}

async fn applied_versions(pool: &PgPool) -> HashSet<i64> {
    // The bookkeeping table is absent on a fresh database.
    sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success")
        .fetch_all(pool)
        .await
        .map(|versions| versions.into_iter().collect())
        .unwrap_or_default()
}

/// Round-trip a `SELECT 1`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the database does not answer.
pub async fn ping(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
