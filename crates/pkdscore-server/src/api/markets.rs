//! Market report routes: reports, their sections, and simple score views.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use pkdscore_db::{SectionHistoryRow, SectionRow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, AppState};

const DEFAULT_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub(super) struct SectionItem {
    pub section_code: String,
    pub section_name: String,
    pub safety_score: i32,
    pub rating: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub median_margin: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub median_roe: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub median_pe: Option<Decimal>,
    #[serde(
        rename = "median_divident_yield",
        with = "rust_decimal::serde::float_option"
    )]
    pub median_dividend_yield: Option<Decimal>,
    pub companies_count: i32,
    pub total_cap_pln: i64,
}

impl From<SectionRow> for SectionItem {
    fn from(row: SectionRow) -> Self {
        Self {
            section_code: row.section_code,
            section_name: row.section_name,
            safety_score: row.safety_score,
            rating: row.rating,
            median_margin: row.median_margin,
            median_roe: row.median_roe,
            median_pe: row.median_pe,
            median_dividend_yield: row.median_dividend_yield,
            companies_count: row.companies_count,
            total_cap_pln: row.total_cap_pln,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ReportItem {
    pub id: i32,
    pub date: NaiveDate,
    pub sections: Vec<SectionItem>,
}

/// A section with the date of the report that recorded it.
#[derive(Debug, Serialize)]
pub(super) struct SectionHistoryItem {
    pub report_id: i32,
    pub report_date: NaiveDate,
    #[serde(flatten)]
    pub section: SectionItem,
}

impl From<SectionHistoryRow> for SectionHistoryItem {
    fn from(row: SectionHistoryRow) -> Self {
        Self {
            report_id: row.report_id,
            report_date: row.report_date,
            section: SectionItem {
                section_code: row.section_code,
                section_name: row.section_name,
                safety_score: row.safety_score,
                rating: row.rating,
                median_margin: row.median_margin,
                median_roe: row.median_roe,
                median_pe: row.median_pe,
                median_dividend_yield: row.median_dividend_yield,
                companies_count: row.companies_count,
                total_cap_pln: row.total_cap_pln,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SimpleScoreItem {
    pub section_code: String,
    pub section_name: String,
    pub safety_score: i32,
    pub rating: String,
}

impl From<SectionRow> for SimpleScoreItem {
    fn from(row: SectionRow) -> Self {
        Self {
            section_code: row.section_code,
            section_name: row.section_name,
            safety_score: row.safety_score,
            rating: row.rating,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LimitQuery {
    pub limit: Option<i64>,
}

pub(super) async fn latest_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ReportItem>, ApiError> {
    let report = pkdscore_db::latest_report(&state.pool)
        .await
        .map_err(|e| map_db_error(&req_id, &e))?
        .ok_or_else(|| ApiError::not_found("Brak raportów w bazie"))?;

    let sections = pkdscore_db::sections_for_reports(&state.pool, &[report.id])
        .await
        .map_err(|e| map_db_error(&req_id, &e))?;

    Ok(Json(ReportItem {
        id: report.id,
        date: report.date,
        sections: sections.into_iter().map(SectionItem::from).collect(),
    }))
}

pub(super) async fn reports_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ReportItem>>, ApiError> {
    let reports =
        pkdscore_db::list_reports(&state.pool, normalize_limit(query.limit, DEFAULT_LIMIT))
            .await
            .map_err(|e| map_db_error(&req_id, &e))?;

    let ids: Vec<i32> = reports.iter().map(|r| r.id).collect();
    let rows = pkdscore_db::sections_for_reports(&state.pool, &ids)
        .await
        .map_err(|e| map_db_error(&req_id, &e))?;

    let mut by_report: BTreeMap<i32, Vec<SectionItem>> = BTreeMap::new();
    for row in rows {
        by_report
            .entry(row.report_id)
            .or_default()
            .push(SectionItem::from(row));
    }

    let data = reports
        .into_iter()
        .map(|report| ReportItem {
            id: report.id,
            date: report.date,
            sections: by_report.remove(&report.id).unwrap_or_default(),
        })
        .collect();

    Ok(Json(data))
}

pub(super) async fn top_sectors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<SectionItem>>, ApiError> {
    let rows = pkdscore_db::top_sections(&state.pool, normalize_limit(query.limit, DEFAULT_LIMIT))
        .await
        .map_err(|e| map_db_error(&req_id, &e))?;

    Ok(Json(rows.into_iter().map(SectionItem::from).collect()))
}

pub(super) async fn sector_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(code): Path<String>,
) -> Result<Json<Vec<SectionHistoryItem>>, ApiError> {
    let code = pkdscore_core::normalize_code(&code);
    let rows = pkdscore_db::section_history(&state.pool, &code)
        .await
        .map_err(|e| map_db_error(&req_id, &e))?;

    Ok(Json(rows.into_iter().map(SectionHistoryItem::from).collect()))
}

pub(super) async fn latest_scores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<SimpleScoreItem>>, ApiError> {
    let rows = pkdscore_db::latest_sections(&state.pool)
        .await
        .map_err(|e| map_db_error(&req_id, &e))?;

    Ok(Json(rows.into_iter().map(SimpleScoreItem::from).collect()))
}

pub(super) async fn sector_score(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(code): Path<String>,
) -> Result<Json<SectionItem>, ApiError> {
    let code = pkdscore_core::normalize_code(&code);
    let row = pkdscore_db::latest_section_for_code(&state.pool, &code)
        .await
        .map_err(|e| map_db_error(&req_id, &e))?
        .ok_or_else(|| ApiError::sector_not_found(&code))?;

    Ok(Json(SectionItem::from(row)))
}
