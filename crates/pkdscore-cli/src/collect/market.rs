use chrono::Local;
use futures::stream::{self, StreamExt};
use pkdscore_core::scoring::market::{build_report, score_sectors, CompanyFundamentals};
use pkdscore_scraper::{BankierClient, TickerCache, YahooClient};

use crate::report;

const TICKER_CONCURRENCY: usize = 20;
const FUNDAMENTALS_CONCURRENCY: usize = 10;
const TICKER_PROGRESS_EVERY: usize = 100;
const FUNDAMENTALS_PROGRESS_EVERY: usize = 50;

/// Refresh the ticker cache, score sections from company fundamentals, write
/// the dated JSON report and, unless `no_import`, store it as a new report.
///
/// # Errors
///
/// Returns an error if the ticker cache cannot be read or written, a client
/// cannot be built, or the report cannot be written or stored. A failed
/// share listing falls back to the cached tickers; failed per-company
/// lookups are skipped.
pub(super) async fn run_collect_market(
    pool: &sqlx::PgPool,
    config: &pkdscore_core::AppConfig,
    no_import: bool,
) -> anyhow::Result<()> {
    let mut cache = TickerCache::load(&config.ticker_cache_path())?;
    tracing::info!(cached = cache.len(), "ticker cache loaded");

    let bankier = BankierClient::new(config.http_timeout_secs, &config.user_agent)?;
    refresh_tickers(&bankier, &mut cache).await?;

    if cache.is_empty() {
        println!("no tickers known; nothing to analyze");
        return Ok(());
    }

    let yahoo = YahooClient::new(config.http_timeout_secs)?;
    let companies = fetch_fundamentals(&yahoo, &cache.symbols()).await;
    let scored = score_sectors(&companies);
    let financial_report = build_report(&scored);
    tracing::info!(
        companies = companies.len(),
        sections = financial_report.len(),
        "market sections scored"
    );

    let date = Local::now().date_naive();
    let path = report::write_report_file(&config.reports_dir(), date, &financial_report)?;
    println!("wrote {} sections to {}", financial_report.len(), path.display());

    if no_import {
        return Ok(());
    }
    let report_id = report::import_report(pool, date, &financial_report).await?;
    println!("stored report {report_id} dated {date}");
    Ok(())
}

/// Merge newly listed tickers into `cache`, saving it when anything was added.
async fn refresh_tickers(bankier: &BankierClient, cache: &mut TickerCache) -> anyhow::Result<()> {
    let slugs = match bankier.list_company_slugs().await {
        Ok(slugs) => slugs,
        Err(e) => {
            tracing::warn!(error = %e, "share listing unavailable; using cached tickers");
            return Ok(());
        }
    };

    let symbols = resolve_symbols(bankier, &slugs).await;
    let added = cache.merge(symbols);
    if added > 0 {
        cache.save()?;
        tracing::info!(added, total = cache.len(), "ticker cache updated");
    } else {
        tracing::info!(total = cache.len(), "no new tickers");
    }
    Ok(())
}

async fn resolve_symbols(bankier: &BankierClient, slugs: &[String]) -> Vec<String> {
    let total = slugs.len();
    let mut completed = 0_usize;
    let mut symbols = Vec::new();

    let mut results = stream::iter(slugs)
        .map(|slug| async move { (slug, bankier.resolve_symbol(slug).await) })
        .buffer_unordered(TICKER_CONCURRENCY);

    while let Some((slug, result)) = results.next().await {
        completed += 1;
        match result {
            Ok(Some(symbol)) => symbols.push(symbol),
            Ok(None) => tracing::debug!(slug = %slug, "no GPW ticker on company page"),
            Err(e) => tracing::warn!(slug = %slug, error = %e, "ticker lookup failed"),
        }
        if completed % TICKER_PROGRESS_EVERY == 0 {
            tracing::info!(completed, total, "ticker resolution progress");
        }
    }
    symbols
}

async fn fetch_fundamentals(yahoo: &YahooClient, symbols: &[String]) -> Vec<CompanyFundamentals> {
    let total = symbols.len();
    let mut completed = 0_usize;
    let mut companies = Vec::new();

    let mut results = stream::iter(symbols)
        .map(|symbol| async move { (symbol, yahoo.fundamentals(symbol).await) })
        .buffer_unordered(FUNDAMENTALS_CONCURRENCY);

    while let Some((symbol, result)) = results.next().await {
        completed += 1;
        match result {
            Ok(Some(company)) => companies.push(company),
            Ok(None) => tracing::debug!(symbol = %symbol, "no quote data"),
            Err(e) => tracing::warn!(symbol = %symbol, error = %e, "fundamentals fetch failed"),
        }
        if completed % FUNDAMENTALS_PROGRESS_EVERY == 0 {
            tracing::info!(completed, total, "fundamentals progress");
        }
    }
    companies
}
