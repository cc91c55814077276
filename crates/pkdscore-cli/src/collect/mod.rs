//! Collection command handlers for the CLI.
//!
//! Every collector paces its requests with a fixed-interval [`Pacer`] and
//! never retries. Per-item failures are logged and skipped; failures that
//! leave nothing to work with (missing keys, rejected credentials, an
//! unreachable first page) end the run.
//!
//! [`Pacer`]: pkdscore_scraper::Pacer

mod ceidg;
mod gus;
mod market;
mod social;

use chrono::NaiveDate;
use clap::Subcommand;

/// Sub-commands available under `collect`.
#[derive(Debug, Subcommand)]
pub enum CollectCommands {
    /// Sample recently registered firms from CEIDG and write a CSV export
    Ceidg,
    /// Fetch revenue series from GUS BDL and rewrite the GUS scores
    Gus,
    /// Resolve GPW tickers, fetch fundamentals and store a market report
    Market {
        /// Write the JSON report but do not insert it into the database
        #[arg(long)]
        no_import: bool,
    },
    /// Store top-level comments of each tag's most viewed recent video
    Youtube {
        /// Last day of the 7-day publish window (defaults to now)
        #[arg(long, value_parser = parse_date)]
        end_date: Option<NaiveDate>,
    },
    /// Store entries from each tag's Wykop stream
    Wykop,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &pkdscore_core::AppConfig,
    command: CollectCommands,
) -> anyhow::Result<()> {
    match command {
        CollectCommands::Ceidg => ceidg::run_collect_ceidg(config).await,
        CollectCommands::Gus => gus::run_collect_gus(pool, config).await,
        CollectCommands::Market { no_import } => {
            market::run_collect_market(pool, config, no_import).await
        }
        CollectCommands::Youtube { end_date } => {
            social::run_collect_youtube(pool, config, end_date).await
        }
        CollectCommands::Wykop => social::run_collect_wykop(pool, config).await,
    }
}
