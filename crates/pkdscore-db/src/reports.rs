//! Database operations for the `report` and `section` tables.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: i32,
    pub date: NaiveDate,
}

/// A row from the `section` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SectionRow {
    pub id: i32,
    pub report_id: i32,
    pub section_code: String,
    pub section_name: String,
    pub safety_score: i32,
    pub rating: String,
    pub median_margin: Option<Decimal>,
    pub median_roe: Option<Decimal>,
    pub median_pe: Option<Decimal>,
    pub median_dividend_yield: Option<Decimal>,
    pub companies_count: i32,
    pub total_cap_pln: i64,
}

/// A section joined with the date of the report it belongs to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SectionHistoryRow {
    pub report_id: i32,
    pub report_date: NaiveDate,
    pub section_code: String,
    pub section_name: String,
    pub safety_score: i32,
    pub rating: String,
    pub median_margin: Option<Decimal>,
    pub median_roe: Option<Decimal>,
    pub median_pe: Option<Decimal>,
    pub median_dividend_yield: Option<Decimal>,
    pub companies_count: i32,
    pub total_cap_pln: i64,
}

/// Input for one section of a new report.
#[derive(Debug, Clone)]
pub struct NewSection {
    pub section_code: String,
    pub section_name: String,
    pub safety_score: i32,
    pub rating: String,
    pub median_margin: Option<Decimal>,
    pub median_roe: Option<Decimal>,
    pub median_pe: Option<Decimal>,
    pub median_dividend_yield: Option<Decimal>,
    pub companies_count: i32,
    pub total_cap_pln: i64,
}

const SECTION_COLUMNS: &str = "s.id, s.report_id, s.section_code, s.section_name, s.safety_score, \
     s.rating, s.median_margin, s.median_roe, s.median_pe, s.median_dividend_yield, \
     s.companies_count, s.total_cap_pln";

// The most recent report: newest date, then highest id.
const LATEST_REPORT_ID: &str = "(SELECT id FROM report ORDER BY date DESC, id DESC LIMIT 1)";

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert a report and all of its sections in one transaction.
///
/// Returns the new report id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is written then.
pub async fn insert_report(
    pool: &PgPool,
    date: NaiveDate,
    sections: &[NewSection],
) -> Result<i32, DbError> {
    let mut tx = pool.begin().await?;

    let report_id: i32 = sqlx::query_scalar("INSERT INTO report (date) VALUES ($1) RETURNING id")
        .bind(date)
        .fetch_one(&mut *tx)
        .await?;

    for section in sections {
        sqlx::query(
            "INSERT INTO section \
                 (report_id, section_code, section_name, safety_score, rating, \
                  median_margin, median_roe, median_pe, median_dividend_yield, \
                  companies_count, total_cap_pln) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(report_id)
        .bind(&section.section_code)
        .bind(&section.section_name)
        .bind(section.safety_score)
        .bind(&section.rating)
        .bind(section.median_margin)
        .bind(section.median_roe)
        .bind(section.median_pe)
        .bind(section.median_dividend_yield)
        .bind(section.companies_count)
        .bind(section.total_cap_pln)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(report_id)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Return the most recent report, or `None` if there are no reports.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_report(pool: &PgPool) -> Result<Option<ReportRow>, DbError> {
    let row = sqlx::query_as::<_, ReportRow>(
        "SELECT id, date FROM report ORDER BY date DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// List the newest `limit` reports, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reports(pool: &PgPool, limit: i64) -> Result<Vec<ReportRow>, DbError> {
    let rows = sqlx::query_as::<_, ReportRow>(
        "SELECT id, date FROM report ORDER BY date DESC, id DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Sections belonging to any of `report_ids`, best score first within a report.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sections_for_reports(
    pool: &PgPool,
    report_ids: &[i32],
) -> Result<Vec<SectionRow>, DbError> {
    let sql = format!(
        "SELECT {SECTION_COLUMNS} FROM section s \
         WHERE s.report_id = ANY($1) \
         ORDER BY s.report_id, s.safety_score DESC, s.section_code"
    );
    let rows = sqlx::query_as::<_, SectionRow>(&sql)
        .bind(report_ids)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Sections of the latest report, best score first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_sections(pool: &PgPool) -> Result<Vec<SectionRow>, DbError> {
    let sql = format!(
        "SELECT {SECTION_COLUMNS} FROM section s \
         WHERE s.report_id = {LATEST_REPORT_ID} \
         ORDER BY s.safety_score DESC, s.section_code"
    );
    let rows = sqlx::query_as::<_, SectionRow>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// The `limit` best-scoring sections of the latest report.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn top_sections(pool: &PgPool, limit: i64) -> Result<Vec<SectionRow>, DbError> {
    let sql = format!(
        "SELECT {SECTION_COLUMNS} FROM section s \
         WHERE s.report_id = {LATEST_REPORT_ID} \
         ORDER BY s.safety_score DESC, s.section_code \
         LIMIT $1"
    );
    let rows = sqlx::query_as::<_, SectionRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Every recorded section for `code`, newest report first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn section_history(pool: &PgPool, code: &str) -> Result<Vec<SectionHistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, SectionHistoryRow>(
        "SELECT s.report_id, r.date AS report_date, s.section_code, s.section_name, \
                s.safety_score, s.rating, s.median_margin, s.median_roe, s.median_pe, \
                s.median_dividend_yield, s.companies_count, s.total_cap_pln \
         FROM section s \
         JOIN report r ON r.id = s.report_id \
         WHERE s.section_code = $1 \
         ORDER BY r.date DESC, r.id DESC",
    )
    .bind(code)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The most recent section recorded for `code`, from whichever report last
/// covered it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_section_for_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<SectionRow>, DbError> {
    let sql = format!(
        "SELECT {SECTION_COLUMNS} FROM section s \
         JOIN report r ON r.id = s.report_id \
         WHERE s.section_code = $1 \
         ORDER BY r.date DESC, r.id DESC \
         LIMIT 1"
    );
    let row = sqlx::query_as::<_, SectionRow>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}
