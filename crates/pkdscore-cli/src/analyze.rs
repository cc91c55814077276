use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::Subcommand;
use pkdscore_core::scoring::ceidg::{normalize, tally_sectors, FirmLifespan, SectorTally};
use pkdscore_scraper::ceidg::{newest_firms_csv, parse_csv_timestamp, read_firms_csv};
use rust_decimal::Decimal;

use crate::decimal2;

/// Sub-commands available under `analyze`.
#[derive(Debug, Subcommand)]
pub enum AnalyzeCommands {
    /// Score sections by firm longevity from a CEIDG export
    Ceidg {
        /// Export to read; defaults to the newest `firmy_*.csv` in the data dir
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &pkdscore_core::AppConfig,
    command: AnalyzeCommands,
) -> anyhow::Result<()> {
    match command {
        AnalyzeCommands::Ceidg { file } => run_analyze_ceidg(pool, config, file).await,
    }
}

/// Read a CEIDG export, score each section by the longevity of its firms as of
/// today and append one `ceidg` row per section stamped with the export time.
async fn run_analyze_ceidg(
    pool: &sqlx::PgPool,
    config: &pkdscore_core::AppConfig,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let path = match file {
        Some(path) => path,
        None => {
            let dir = config.ceidg_dir();
            newest_firms_csv(&dir)?.with_context(|| {
                format!(
                    "no firmy_*.csv export in {}; run `pkdscore collect ceidg` first",
                    dir.display()
                )
            })?
        }
    };

    let (collected_at, today) = analysis_dates(&path, Local::now());
    let records = read_firms_csv(&path)?;
    let lifespans: Vec<FirmLifespan> = records.iter().map(|r| r.lifespan()).collect();
    let tallies = tally_sectors(&lifespans, today);
    for (code, tally) in &tallies {
        tracing::info!(
            section = *code,
            firms = tally.firms,
            active_balance = tally.active_balance,
            "CEIDG section tally"
        );
    }
    let scores = score_tallies(&tallies);
    tracing::info!(
        path = %path.display(),
        firms = records.len(),
        sections = scores.len(),
        "CEIDG export scored"
    );

    if scores.is_empty() {
        println!("no firm in {} maps to a PKD section", path.display());
        return Ok(());
    }

    let written = pkdscore_db::insert_ceidg_scores(pool, &scores, collected_at).await?;
    for (code, score) in &scores {
        println!("{code}\t{score}");
    }
    println!("stored {written} CEIDG scores dated {collected_at}");
    Ok(())
}

/// Collection time and scoring day for an export analyzed at `now`.
///
/// The collection time comes from the file name (local time), falling back to
/// `now`. Firm ages are always measured to the day of the analysis.
pub(crate) fn analysis_dates(
    path: &std::path::Path,
    now: DateTime<Local>,
) -> (DateTime<Utc>, NaiveDate) {
    let collected_at = parse_csv_timestamp(path)
        .and_then(|stamp| stamp.and_local_timezone(Local).earliest())
        .unwrap_or(now)
        .with_timezone(&Utc);
    (collected_at, now.date_naive())
}

/// Normalized longevity score per section, rounded to two decimals.
pub(crate) fn score_tallies(
    tallies: &BTreeMap<&'static str, SectorTally>,
) -> Vec<(String, Decimal)> {
    normalize(tallies)
        .into_iter()
        .filter_map(|(code, score)| decimal2(score).map(|d| (code.to_string(), d)))
        .collect()
}
