use std::time::Duration;

use anyhow::Context;
use chrono::{Local, Utc};
use pkdscore_scraper::ceidg::{page_count, sample_pages, write_firms_csv};
use pkdscore_scraper::{CeidgClient, FirmRecord, Pacer};

/// Firms registered within this many days are sampled.
const LOOKBACK_DAYS: i64 = 5 * 365 + 1;
const PAGE_PAUSE: Duration = Duration::from_secs(5);
const DETAIL_PAUSE: Duration = Duration::from_secs(5);
const FAILURE_PAUSE: Duration = Duration::from_secs(1);
const PROGRESS_EVERY: usize = 5;

/// Sample firm ids from random search pages, fetch each firm's details and
/// write them to a `firmy_*.csv` export.
///
/// # Errors
///
/// Returns an error if the CEIDG key is missing, any search page fails, or
/// the export cannot be written. Failed detail lookups are skipped.
pub(super) async fn run_collect_ceidg(config: &pkdscore_core::AppConfig) -> anyhow::Result<()> {
    let client = CeidgClient::new(
        config.keys.ceidg()?,
        config.http_timeout_secs,
        &config.user_agent,
    )?;
    let started_from = Utc::now().date_naive() - chrono::Duration::days(LOOKBACK_DAYS);
    let mut pacer = Pacer::new(PAGE_PAUSE);

    pacer.wait().await;
    let first = client
        .search_page(started_from, 0)
        .await
        .context("CEIDG firm search failed")?;
    let total_pages = page_count(first.count);
    if total_pages == 0 {
        println!("CEIDG returned no firms registered since {started_from}");
        return Ok(());
    }

    let pages = sample_pages(total_pages);
    tracing::info!(
        firms = first.count,
        total_pages,
        sampled = pages.len(),
        "CEIDG search sampled"
    );

    let mut ids = Vec::new();
    for page in pages {
        pacer.wait().await;
        let result = client
            .search_page(started_from, page)
            .await
            .with_context(|| format!("CEIDG search page {page} failed"))?;
        ids.extend(result.firmy.into_iter().map(|f| f.id));
    }
    tracing::info!(ids = ids.len(), "CEIDG firm ids collected");

    let mut records: Vec<FirmRecord> = Vec::with_capacity(ids.len());
    let mut pause = DETAIL_PAUSE;
    for (i, id) in ids.iter().enumerate() {
        pacer.wait_for(pause).await;
        match client.firm_details(id).await {
            Ok(Some(detail)) => {
                records.push(FirmRecord::from(detail));
                pause = DETAIL_PAUSE;
            }
            Ok(None) => {
                tracing::warn!(firm_id = %id, "CEIDG returned no details");
                pause = FAILURE_PAUSE;
            }
            Err(e) => {
                tracing::warn!(firm_id = %id, error = %e, "CEIDG detail fetch failed");
                pause = FAILURE_PAUSE;
            }
        }
        if (i + 1) % PROGRESS_EVERY == 0 {
            tracing::info!(processed = i + 1, total = ids.len(), "CEIDG detail progress");
        }
    }

    let path = write_firms_csv(&config.ceidg_dir(), Local::now().naive_local(), &records)?;
    println!(
        "wrote {} of {} firms to {}",
        records.len(),
        ids.len(),
        path.display()
    );
    Ok(())
}
