//! Market safety score derived from the fundamentals of listed companies.
//!
//! Companies are mapped to PKD sections from their Yahoo industry (falling
//! back to the broader sector), aggregated per section, and scored on five
//! fixed-weight components that sum to at most 100.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scoring::median;
use crate::sectors;

/// Sections with fewer listed companies are left out of a report.
pub const MIN_COMPANIES: usize = 3;

const INDUSTRY_TO_PKD: &[(&str, &str)] = &[
    ("Engineering & Construction", "F"),
    ("Residential Construction", "F"),
    ("Building Materials", "F"),
    ("Apparel Retail", "G"),
    ("Specialty Retail", "G"),
    ("Grocery Stores", "G"),
    ("Internet Retail", "G"),
    ("Auto Parts", "G"),
    ("Auto & Truck Dealerships", "G"),
    ("Luxury Goods", "G"),
    ("Software - Infrastructure", "J"),
    ("Software - Application", "J"),
    ("Electronic Gaming & Multimedia", "J"),
    ("Entertainment", "J"),
    ("Telecom Services", "J"),
    ("Internet Content & Information", "J"),
    ("Banks - Regional", "K"),
    ("Insurance - Diversified", "K"),
    ("Insurance - Life", "K"),
    ("Capital Markets", "K"),
    ("Other Industrial Metals & Mining", "B"),
    ("Copper", "B"),
    ("Coal", "B"),
    ("Oil & Gas E&P", "B"),
    ("Chemicals", "C"),
    ("Specialty Chemicals", "C"),
    ("Aerospace & Defense", "C"),
    ("Packaging & Containers", "C"),
    ("Medical Instruments & Supplies", "C"),
    ("Utilities - Regulated Electric", "D"),
    ("Utilities - Renewable", "D"),
    ("Real Estate - Development", "L"),
    ("Diagnostics & Research", "M"),
    ("Biotechnology", "M"),
    ("Hospitals", "Q"),
];

const SECTOR_TO_PKD: &[(&str, &str)] = &[
    ("Financial Services", "K"),
    ("Technology", "J"),
    ("Communication Services", "J"),
    ("Energy", "D"),
    ("Utilities", "D"),
    ("Consumer Cyclical", "G"),
    ("Consumer Defensive", "G"),
    ("Industrials", "C"),
    ("Basic Materials", "C"),
    ("Real Estate", "L"),
    ("Healthcare", "Q"),
];

/// Fundamentals of one listed company, as fetched from the quote provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyFundamentals {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub revenue: Option<f64>,
    pub pe_trailing: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub roe: Option<f64>,
    pub profit_margin: Option<f64>,
    pub dividend_yield: Option<f64>,
}

/// Map a company to a PKD section: industry first, sector as fallback.
#[must_use]
pub fn pkd_for_company(industry: Option<&str>, sector: Option<&str>) -> Option<&'static str> {
    lookup(INDUSTRY_TO_PKD, industry).or_else(|| lookup(SECTOR_TO_PKD, sector))
}

fn lookup(table: &[(&str, &'static str)], key: Option<&str>) -> Option<&'static str> {
    let key = key?;
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, code)| *code)
}

/// Per-section aggregate of company fundamentals.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorAggregate {
    pub code: &'static str,
    pub companies_count: usize,
    pub total_cap: f64,
    pub total_revenue: f64,
    pub median_margin: Option<f64>,
    pub median_roe: Option<f64>,
    pub median_pe: Option<f64>,
    pub median_dividend_yield: Option<f64>,
}

/// Group companies by PKD section, ordered by total revenue (largest first).
///
/// Companies that map to no section are dropped.
#[must_use]
pub fn aggregate(companies: &[CompanyFundamentals]) -> Vec<SectorAggregate> {
    let mut groups: BTreeMap<&'static str, Vec<&CompanyFundamentals>> = BTreeMap::new();
    for company in companies {
        if let Some(code) = pkd_for_company(company.industry.as_deref(), company.sector.as_deref())
        {
            groups.entry(code).or_default().push(company);
        }
    }

    let mut aggregates: Vec<SectorAggregate> = groups
        .into_iter()
        .map(|(code, members)| SectorAggregate {
            code,
            companies_count: members.iter().filter(|c| c.market_cap.is_some()).count(),
            total_cap: members.iter().filter_map(|c| c.market_cap).sum(),
            total_revenue: members.iter().filter_map(|c| c.revenue).sum(),
            median_margin: median(members.iter().filter_map(|c| c.profit_margin)),
            median_roe: median(members.iter().filter_map(|c| c.roe)),
            median_pe: median(members.iter().filter_map(|c| c.pe_trailing)),
            median_dividend_yield: median(members.iter().filter_map(|c| c.dividend_yield)),
        })
        .collect();

    aggregates.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    aggregates
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    A,
    B,
    C,
    D,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::A => write!(f, "A"),
            Rating::B => write!(f, "B"),
            Rating::C => write!(f, "C"),
            Rating::D => write!(f, "D"),
        }
    }
}

#[must_use]
pub fn rating_for(score: f64) -> Rating {
    if score >= 80.0 {
        Rating::A
    } else if score >= 60.0 {
        Rating::B
    } else if score >= 40.0 {
        Rating::C
    } else {
        Rating::D
    }
}

/// Weighted sum of the five components, capped at 100.
///
/// | component | weight | saturates at |
/// |---|---|---|
/// | profit margin | 25 | 15% |
/// | ROE | 15 | 12% |
/// | company count | 10 | 10 companies |
/// | dividend yield | 20 | 4% |
/// | PE band | 30 / 10 / 0 | 5..=25 / 25..=40 / other |
///
/// Missing medians contribute nothing.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn safety_score(agg: &SectorAggregate) -> f64 {
    let ratio = |value: Option<f64>, saturation: f64| {
        value.map_or(0.0, |v| (v.max(0.0) / saturation).min(1.0))
    };

    let s_margin = ratio(agg.median_margin, 0.15) * 25.0;
    let s_roe = ratio(agg.median_roe, 0.12) * 15.0;
    let s_scale = (agg.companies_count as f64 / 10.0).min(1.0) * 10.0;
    let s_div = ratio(agg.median_dividend_yield, 0.04) * 20.0;
    let s_pe = match agg.median_pe {
        Some(pe) if (5.0..=25.0).contains(&pe) => 30.0,
        Some(pe) if pe > 25.0 && pe <= 40.0 => 10.0,
        _ => 0.0,
    };

    (s_margin + s_roe + s_scale + s_div + s_pe).min(100.0)
}

/// One scored section of a market report.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSector {
    pub aggregate: SectorAggregate,
    pub safety_score: i32,
    pub rating: Rating,
}

/// Aggregate, filter and score companies into report sections.
///
/// Order follows [`aggregate`]: largest total revenue first.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn score_sectors(companies: &[CompanyFundamentals]) -> Vec<ScoredSector> {
    aggregate(companies)
        .into_iter()
        .filter(|agg| agg.companies_count >= MIN_COMPANIES)
        .map(|agg| {
            let score = safety_score(&agg);
            ScoredSector {
                safety_score: score.trunc() as i32,
                rating: rating_for(score),
                aggregate: agg,
            }
        })
        .collect()
}

/// Medians block of a report entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialHealth {
    pub median_margin: Option<f64>,
    pub median_roe: Option<f64>,
    pub median_pe: Option<f64>,
    pub median_dividend_yield: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub companies_count: i32,
    pub total_cap_pln: i64,
}

/// One section of the dated JSON financial report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub section_name: String,
    pub safety_score: i32,
    pub rating: Rating,
    pub financial_health: FinancialHealth,
    pub market_data: MarketData,
}

/// The JSON financial report, keyed by PKD section code.
pub type FinancialReport = BTreeMap<String, ReportEntry>;

/// Convert scored sections into the report file shape.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn build_report(scored: &[ScoredSector]) -> FinancialReport {
    scored
        .iter()
        .map(|s| {
            let agg = &s.aggregate;
            let section_name = sectors::section(agg.code)
                .map_or_else(|| agg.code.to_string(), |sec| sec.short_name.to_string());
            let entry = ReportEntry {
                section_name,
                safety_score: s.safety_score,
                rating: s.rating,
                financial_health: FinancialHealth {
                    median_margin: agg.median_margin,
                    median_roe: agg.median_roe,
                    median_pe: agg.median_pe,
                    median_dividend_yield: agg.median_dividend_yield,
                },
                market_data: MarketData {
                    companies_count: i32::try_from(agg.companies_count).unwrap_or(i32::MAX),
                    total_cap_pln: agg.total_cap.round() as i64,
                },
            };
            (agg.code.to_string(), entry)
        })
        .collect()
}
