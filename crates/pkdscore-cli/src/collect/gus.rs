use std::collections::BTreeMap;
use std::time::Duration;

use pkdscore_core::scoring::gus::{growth_score, median_growth, recent_window};
use pkdscore_core::scoring::round2;
use pkdscore_scraper::gus::{candidate_variables, REVENUE_VARIABLE_QUERY};
use pkdscore_scraper::{GusClient, Pacer};

use crate::decimal2;

const REQUEST_PAUSE: Duration = Duration::from_secs(1);

/// Score revenue growth for every section GUS reports on and replace the
/// `gus` table with the result.
///
/// # Errors
///
/// Returns an error if the GUS key is missing, the variable search fails, or
/// the table cannot be rewritten. Failed series fetches are skipped.
pub(super) async fn run_collect_gus(
    pool: &sqlx::PgPool,
    config: &pkdscore_core::AppConfig,
) -> anyhow::Result<()> {
    let client = GusClient::new(config.keys.gus()?, config.http_timeout_secs, &config.user_agent)?;
    let variables = client.search_variables(REVENUE_VARIABLE_QUERY).await?;
    let candidates = candidate_variables(&variables);
    tracing::info!(
        variables = variables.len(),
        candidates = candidates.len(),
        "GUS variables found"
    );

    let mut pacer = Pacer::new(REQUEST_PAUSE);
    let mut scores: BTreeMap<&'static str, f64> = BTreeMap::new();
    for (code, variable) in candidates {
        if scores.contains_key(code) {
            continue;
        }
        pacer.wait().await;
        let series = match client.national_series(variable.id).await {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(variable_id = variable.id, section = code, error = %e, "GUS series fetch failed");
                continue;
            }
        };
        let Some(window) = recent_window(series) else {
            tracing::debug!(variable_id = variable.id, section = code, "GUS series too old");
            continue;
        };
        let score = round2(growth_score(median_growth(&window)));
        tracing::info!(section = code, score, "GUS section scored");
        scores.insert(code, score);
    }

    if scores.is_empty() {
        tracing::warn!("no GUS section could be scored; keeping existing rows");
        println!("no GUS scores computed; table left unchanged");
        return Ok(());
    }

    let rows: Vec<(String, rust_decimal::Decimal)> = scores
        .iter()
        .filter_map(|(code, score)| decimal2(*score).map(|d| ((*code).to_string(), d)))
        .collect();
    let written = pkdscore_db::replace_gus_scores(pool, &rows).await?;
    println!("rewrote gus table with {written} sections");
    Ok(())
}
