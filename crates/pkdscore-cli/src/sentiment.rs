use clap::Subcommand;
use pkdscore_sentiment::emotion_score;

use crate::decimal2;

/// Sub-commands available under `sentiment`.
#[derive(Debug, Subcommand)]
pub enum SentimentCommands {
    /// Give every stored post without an emotion score one
    Score {
        /// Posts read per query
        #[arg(long, default_value_t = 500)]
        batch: i64,
    },
}

pub(crate) async fn run(pool: &sqlx::PgPool, command: SentimentCommands) -> anyhow::Result<()> {
    match command {
        SentimentCommands::Score { batch } => {
            let batch = batch.max(1);
            let youtube = score_youtube(pool, batch).await?;
            let wykop = score_wykop(pool, batch).await?;
            println!("scored {youtube} YouTube comments and {wykop} Wykop posts");
            Ok(())
        }
    }
}

async fn score_youtube(pool: &sqlx::PgPool, batch: i64) -> anyhow::Result<usize> {
    let mut total = 0_usize;
    loop {
        let rows = pkdscore_db::list_unscored_youtube_comments(pool, batch).await?;
        if rows.is_empty() {
            break;
        }
        let mut scored = 0_usize;
        for row in &rows {
            let Some(emocje) = decimal2(emotion_score(&row.komentarz)) else {
                continue;
            };
            pkdscore_db::set_youtube_emocje(pool, row.id, emocje).await?;
            scored += 1;
        }
        tracing::info!(batch = rows.len(), scored, "YouTube comments scored");
        total += scored;
        if scored == 0 {
            break;
        }
    }
    Ok(total)
}

async fn score_wykop(pool: &sqlx::PgPool, batch: i64) -> anyhow::Result<usize> {
    let mut total = 0_usize;
    loop {
        let rows = pkdscore_db::list_unscored_wykop_posts(pool, batch).await?;
        if rows.is_empty() {
            break;
        }
        let mut scored = 0_usize;
        for row in &rows {
            let Some(emocje) = decimal2(emotion_score(&row.post)) else {
                continue;
            };
            pkdscore_db::set_wykop_emocje(pool, row.id, emocje).await?;
            scored += 1;
        }
        tracing::info!(batch = rows.len(), scored, "Wykop posts scored");
        total += scored;
        if scored == 0 {
            break;
        }
    }
    Ok(total)
}
