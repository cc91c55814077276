//! Database operations for tags and the social post tables
//! (`komentarz_youtube`, `post_wykop`).
//!
//! Posts are deduplicated by the platform's own id. Inserting a post that is
//! already stored is a no-op reported as `Ok(false)`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagRow {
    pub id: i32,
    pub tag_name: String,
    pub pkd: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct YoutubeCommentRow {
    pub id: i64,
    pub youtube_id: String,
    pub tag_id: i32,
    pub komentarz: String,
    pub emocje: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WykopPostRow {
    pub id: i64,
    pub tag_id: i32,
    pub post: String,
    pub emocje: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Mean emotion of one platform's posts for one section.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SectorSentimentRow {
    pub pkd: String,
    pub average: f64,
    pub post_count: i64,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// List all tags ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tags(pool: &PgPool) -> Result<Vec<TagRow>, DbError> {
    let rows = sqlx::query_as::<_, TagRow>("SELECT id, tag_name, pkd FROM tag ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Inserts
// ---------------------------------------------------------------------------

/// Store a YouTube comment. Returns `false` if `youtube_id` is already stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails for any other reason.
pub async fn insert_youtube_comment(
    pool: &PgPool,
    youtube_id: &str,
    tag_id: i32,
    komentarz: &str,
    emocje: Option<Decimal>,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO komentarz_youtube (youtube_id, tag_id, komentarz, emocje) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (youtube_id) DO NOTHING",
    )
    .bind(youtube_id)
    .bind(tag_id)
    .bind(komentarz)
    .bind(emocje)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Store a Wykop entry under its Wykop id. Returns `false` if already stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails for any other reason.
pub async fn insert_wykop_post(
    pool: &PgPool,
    id: i64,
    tag_id: i32,
    post: &str,
    emocje: Option<Decimal>,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO post_wykop (id, tag_id, post, emocje) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(id)
    .bind(tag_id)
    .bind(post)
    .bind(emocje)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// List stored YouTube comments, newest first, optionally for one tag.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_youtube_comments(
    pool: &PgPool,
    tag_id: Option<i32>,
    limit: i64,
) -> Result<Vec<YoutubeCommentRow>, DbError> {
    let rows = sqlx::query_as::<_, YoutubeCommentRow>(
        "SELECT id, youtube_id, tag_id, komentarz, emocje, created_at \
         FROM komentarz_youtube \
         WHERE ($1::INTEGER IS NULL OR tag_id = $1) \
         ORDER BY id DESC \
         LIMIT $2",
    )
    .bind(tag_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List stored Wykop posts, newest first, optionally for one tag.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_wykop_posts(
    pool: &PgPool,
    tag_id: Option<i32>,
    limit: i64,
) -> Result<Vec<WykopPostRow>, DbError> {
    let rows = sqlx::query_as::<_, WykopPostRow>(
        "SELECT id, tag_id, post, emocje, created_at \
         FROM post_wykop \
         WHERE ($1::INTEGER IS NULL OR tag_id = $1) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(tag_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// YouTube comments that have no emotion score yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unscored_youtube_comments(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<YoutubeCommentRow>, DbError> {
    let rows = sqlx::query_as::<_, YoutubeCommentRow>(
        "SELECT id, youtube_id, tag_id, komentarz, emocje, created_at \
         FROM komentarz_youtube \
         WHERE emocje IS NULL \
         ORDER BY id \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Wykop posts that have no emotion score yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unscored_wykop_posts(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<WykopPostRow>, DbError> {
    let rows = sqlx::query_as::<_, WykopPostRow>(
        "SELECT id, tag_id, post, emocje, created_at \
         FROM post_wykop \
         WHERE emocje IS NULL \
         ORDER BY id \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Set the emotion score of one YouTube comment.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no comment has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_youtube_emocje(pool: &PgPool, id: i64, emocje: Decimal) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE komentarz_youtube SET emocje = $2 WHERE id = $1")
        .bind(id)
        .bind(emocje)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Set the emotion score of one Wykop post.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no post has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_wykop_emocje(pool: &PgPool, id: i64, emocje: Decimal) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE post_wykop SET emocje = $2 WHERE id = $1")
        .bind(id)
        .bind(emocje)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Mean YouTube emotion per section, over comments that have a score.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sector_sentiment_youtube(pool: &PgPool) -> Result<Vec<SectorSentimentRow>, DbError> {
    let rows = sqlx::query_as::<_, SectorSentimentRow>(
        "SELECT t.pkd, AVG(k.emocje)::DOUBLE PRECISION AS average, COUNT(k.emocje) AS post_count \
         FROM komentarz_youtube k \
         JOIN tag t ON t.id = k.tag_id \
         WHERE k.emocje IS NOT NULL \
         GROUP BY t.pkd \
         ORDER BY t.pkd",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Mean Wykop emotion per section, over posts that have a score.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sector_sentiment_wykop(pool: &PgPool) -> Result<Vec<SectorSentimentRow>, DbError> {
    let rows = sqlx::query_as::<_, SectorSentimentRow>(
        "SELECT t.pkd, AVG(w.emocje)::DOUBLE PRECISION AS average, COUNT(w.emocje) AS post_count \
         FROM post_wykop w \
         JOIN tag t ON t.id = w.tag_id \
         WHERE w.emocje IS NOT NULL \
         GROUP BY t.pkd \
         ORDER BY t.pkd",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
