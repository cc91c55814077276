use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use pkdscore_db::TagRow;
use pkdscore_scraper::Pacer;
use pkdscore_sentiment::{PublishWindow, SentimentError, StreamBudget, WykopClient, YoutubeClient};

const TAG_PAUSE: Duration = Duration::from_secs(1);
const PAGE_PAUSE: Duration = Duration::from_secs(1);

/// For each tag, store the top-level comments of the most viewed medium
/// length video published in the 7 days ending at `end_date`.
///
/// Comments are stored unscored; `pkdscore sentiment score` fills them in.
///
/// # Errors
///
/// Returns an error if the YouTube key is missing, the tags cannot be read,
/// or a comment cannot be stored. A failed search or comment fetch skips
/// that tag.
pub(super) async fn run_collect_youtube(
    pool: &sqlx::PgPool,
    config: &pkdscore_core::AppConfig,
    end_date: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let client = YoutubeClient::new(
        config.keys.youtube()?,
        config.http_timeout_secs,
        &config.user_agent,
    )?;
    let tags = load_tags(pool).await?;
    let window = PublishWindow::ending(end_date, Utc::now());
    let mut pacer = Pacer::new(TAG_PAUSE);
    let mut total_stored = 0_usize;

    for tag in &tags {
        pacer.wait().await;
        let video = match client.top_video(&tag.tag_name, window).await {
            Ok(Some(video)) => video,
            Ok(None) => {
                tracing::info!(tag = %tag.tag_name, "no video in publish window");
                continue;
            }
            Err(e) => {
                tracing::warn!(tag = %tag.tag_name, error = %e, "YouTube search failed");
                continue;
            }
        };

        let comments = match client.top_level_comments(&video.video_id).await {
            Ok(comments) => comments,
            Err(SentimentError::CommentsDisabled { video_id }) => {
                tracing::info!(tag = %tag.tag_name, video_id = %video_id, "comments disabled");
                continue;
            }
            Err(e) => {
                tracing::warn!(tag = %tag.tag_name, video_id = %video.video_id, error = %e, "comment fetch failed");
                continue;
            }
        };

        let mut stored = 0_usize;
        for comment in &comments {
            if pkdscore_db::insert_youtube_comment(
                pool,
                &comment.comment_id,
                tag.id,
                &comment.text,
                None,
            )
            .await?
            {
                stored += 1;
            }
        }
        tracing::info!(
            tag = %tag.tag_name,
            video_id = %video.video_id,
            title = %video.title,
            fetched = comments.len(),
            stored,
            "YouTube comments stored"
        );
        total_stored += stored;
    }

    println!("stored {total_stored} new YouTube comments for {} tags", tags.len());
    Ok(())
}

/// For each tag, page through its Wykop stream and store new entries until
/// the tag's [`StreamBudget`] is spent.
///
/// # Errors
///
/// Returns an error if the Wykop credentials are missing or rejected, the
/// tags cannot be read, or an entry cannot be stored. A failed page fetch
/// counts as an empty page.
pub(super) async fn run_collect_wykop(
    pool: &sqlx::PgPool,
    config: &pkdscore_core::AppConfig,
) -> anyhow::Result<()> {
    let (key, secret) = config.keys.wykop()?;
    let client = WykopClient::login(key, secret, config.http_timeout_secs, &config.user_agent)
        .await
        .context("Wykop login failed")?;
    let tags = load_tags(pool).await?;
    let mut pacer = Pacer::new(PAGE_PAUSE);
    let mut total_stored = 0_usize;

    for tag in &tags {
        let stored = collect_tag_stream(pool, &client, &mut pacer, tag).await?;
        tracing::info!(tag = %tag.tag_name, stored, "Wykop tag done");
        total_stored += stored;
    }

    println!("stored {total_stored} new Wykop posts for {} tags", tags.len());
    Ok(())
}

async fn collect_tag_stream(
    pool: &sqlx::PgPool,
    client: &WykopClient,
    pacer: &mut Pacer,
    tag: &TagRow,
) -> anyhow::Result<usize> {
    let mut budget = StreamBudget::default();

    while !budget.exhausted() {
        let page = budget.next_page();
        pacer.wait().await;
        let entries = match client.tag_stream(&tag.tag_name, page).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(tag = %tag.tag_name, page, error = %e, "Wykop page fetch failed");
                Vec::new()
            }
        };
        budget.record_page(entries.len());

        let mut stored_on_page = 0_usize;
        for entry in &entries {
            if budget.target_reached() {
                break;
            }
            let (Some(id), Some(text)) = (entry.id, entry.text()) else {
                continue;
            };
            if pkdscore_db::insert_wykop_post(pool, id, tag.id, text, None).await? {
                budget.record_stored();
                stored_on_page += 1;
            }
        }
        tracing::info!(
            tag = %tag.tag_name,
            page,
            fetched = entries.len(),
            stored = stored_on_page,
            "Wykop page processed"
        );
    }

    Ok(budget.stored())
}

async fn load_tags(pool: &sqlx::PgPool) -> anyhow::Result<Vec<TagRow>> {
    let tags = pkdscore_db::list_tags(pool).await?;
    if tags.is_empty() {
        tracing::warn!("no tags configured; run `pkdscore db seed` first");
    }
    Ok(tags)
}
