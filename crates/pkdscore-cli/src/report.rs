//! The dated JSON financial report: file naming, reading, writing, and
//! storing it as a `report` with its sections.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use pkdscore_core::scoring::market::FinancialReport;
use pkdscore_db::NewSection;
use rust_decimal::prelude::*;

use crate::collect::parse_date;

const FILE_PREFIX: &str = "financial_report_";
const FILE_SUFFIX: &str = ".json";

/// Sub-commands available under `import`.
#[derive(Debug, Subcommand)]
pub enum ImportCommands {
    /// Store a `financial_report_YYYY-MM-DD.json` file as a new report
    Report {
        path: PathBuf,

        /// Report date; taken from the file name when omitted
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

pub(crate) async fn run(pool: &sqlx::PgPool, command: ImportCommands) -> anyhow::Result<()> {
    match command {
        ImportCommands::Report { path, date } => {
            let date = match date {
                Some(date) => date,
                None => report_date_from_path(&path).with_context(|| {
                    format!(
                        "cannot read a date from {}; pass --date YYYY-MM-DD",
                        path.display()
                    )
                })?,
            };
            let report = read_report_file(&path)?;
            let report_id = import_report(pool, date, &report).await?;
            println!(
                "imported {} sections from {} as report {report_id}",
                report.len(),
                path.display()
            );
            Ok(())
        }
    }
}

pub(crate) fn report_file_name(date: NaiveDate) -> String {
    format!("{FILE_PREFIX}{}{FILE_SUFFIX}", date.format("%Y-%m-%d"))
}

pub(crate) fn report_date_from_path(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let stamp = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    NaiveDate::parse_from_str(stamp, "%Y-%m-%d").ok()
}

/// Write `report` as pretty JSON to `<dir>/financial_report_<date>.json`.
pub(crate) fn write_report_file(
    dir: &Path,
    date: NaiveDate,
    report: &FinancialReport,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(report_file_name(date));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub(crate) fn read_report_file(path: &Path) -> anyhow::Result<FinancialReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let report = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a financial report", path.display()))?;
    Ok(report)
}

pub(crate) fn to_new_sections(report: &FinancialReport) -> Vec<NewSection> {
    report
        .iter()
        .map(|(code, entry)| {
            let health = &entry.financial_health;
            NewSection {
                section_code: code.clone(),
                section_name: entry.section_name.clone(),
                safety_score: entry.safety_score,
                rating: entry.rating.to_string(),
                median_margin: health.median_margin.and_then(Decimal::from_f64),
                median_roe: health.median_roe.and_then(Decimal::from_f64),
                median_pe: health.median_pe.and_then(Decimal::from_f64),
                median_dividend_yield: health.median_dividend_yield.and_then(Decimal::from_f64),
                companies_count: entry.market_data.companies_count,
                total_cap_pln: entry.market_data.total_cap_pln,
            }
        })
        .collect()
}

pub(crate) async fn import_report(
    pool: &sqlx::PgPool,
    date: NaiveDate,
    report: &FinancialReport,
) -> anyhow::Result<i32> {
    let sections = to_new_sections(report);
    let report_id = pkdscore_db::insert_report(pool, date, &sections).await?;
    tracing::info!(report_id, %date, sections = sections.len(), "report stored");
    Ok(report_id)
}
