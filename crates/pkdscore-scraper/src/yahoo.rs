//! Company fundamentals from the Yahoo Finance `quoteSummary` endpoint.
//!
//! The endpoint needs a session cookie and a matching "crumb" token. Both are
//! obtained lazily on first use and cached in the client; a 401 drops the
//! cached pair so the next call re-authenticates.

use percent_encoding::utf8_percent_encode;
use pkdscore_core::scoring::market::CompanyFundamentals;
use reqwest::{header, Client, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::ScraperError;
use crate::http;

const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
const DEFAULT_API_BASE: &str = "https://query1.finance.yahoo.com/";
const PROVIDER: &str = "Yahoo Finance";

// Yahoo rejects the crumb request for non-browser agents.
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const MODULES: &str = "price,summaryProfile,summaryDetail,financialData,defaultKeyStatistics";

#[derive(Debug, Clone)]
struct Crumb {
    cookie: String,
    crumb: String,
}

pub struct YahooClient {
    client: Client,
    cookie_url: Url,
    api_base: Url,
    crumb: RwLock<Option<Crumb>>,
}

impl YahooClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, ScraperError> {
        Self::with_base_urls(timeout_secs, DEFAULT_COOKIE_URL, DEFAULT_API_BASE)
    }

    /// Creates a client with custom cookie and API endpoints (for wiremock
    /// tests).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ScraperError::InvalidBaseUrl`] if either URL is invalid.
    pub fn with_base_urls(
        timeout_secs: u64,
        cookie_url: &str,
        api_base: &str,
    ) -> Result<Self, ScraperError> {
        let cookie_url = Url::parse(cookie_url).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: cookie_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client: http::build_client(timeout_secs, BROWSER_UA)?,
            cookie_url,
            api_base: http::parse_base_url(api_base)?,
            crumb: RwLock::new(None),
        })
    }

    /// Fundamentals of `symbol` (e.g. `"PKO.WA"`), or `None` if Yahoo does
    /// not know it.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Auth`] if the cookie/crumb handshake fails or
    /// the crumb is rejected, and other [`ScraperError`] variants on transport
    /// failure or an unparseable body.
    pub async fn fundamentals(
        &self,
        symbol: &str,
    ) -> Result<Option<CompanyFundamentals>, ScraperError> {
        let crumb = self.crumb().await?;

        let encoded = utf8_percent_encode(symbol, http::PATH_SEGMENT);
        let mut url = http::join(&self.api_base, &format!("v10/finance/quoteSummary/{encoded}"))?;
        url.query_pairs_mut()
            .append_pair("modules", MODULES)
            .append_pair("crumb", &crumb.crumb);

        let response = self
            .client
            .get(url.clone())
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.clear_crumb().await;
            return Err(ScraperError::Auth {
                provider: PROVIDER.to_owned(),
                reason: "crumb rejected".to_owned(),
            });
        }

        let response = match http::check_status(response, &url) {
            Ok(response) => response,
            Err(ScraperError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let body: QuoteSummaryResponse =
            http::decode_json(response, format!("quoteSummary {symbol}")).await?;

        Ok(body
            .quote_summary
            .result
            .into_iter()
            .next()
            .and_then(|result| result.into_fundamentals(symbol)))
    }

    /// Drop the cached cookie and crumb.
    pub async fn clear_crumb(&self) {
        *self.crumb.write().await = None;
    }

    async fn crumb(&self) -> Result<Crumb, ScraperError> {
        if let Some(crumb) = self.crumb.read().await.as_ref() {
            return Ok(crumb.clone());
        }

        let mut guard = self.crumb.write().await;
        // Another task may have authenticated while we waited for the lock.
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }
        let crumb = self.fetch_crumb().await?;
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    async fn fetch_crumb(&self) -> Result<Crumb, ScraperError> {
        let auth_err = |reason: &str| ScraperError::Auth {
            provider: PROVIDER.to_owned(),
            reason: reason.to_owned(),
        };

        // The cookie endpoint answers 404 but still sets the session cookie.
        let response = self.client.get(self.cookie_url.clone()).send().await?;
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.split_once(';').map_or(s, |(v, _)| v).to_owned())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| auth_err("no session cookie"))?;

        let crumb_url = http::join(&self.api_base, "v1/test/getcrumb")?;
        let response = http::send(
            self.client
                .get(crumb_url.clone())
                .header(header::COOKIE, &cookie),
            &crumb_url,
        )
        .await?;
        let crumb = response.text().await?.trim().to_owned();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(auth_err("empty crumb"));
        }

        tracing::debug!("obtained Yahoo Finance crumb");
        Ok(Crumb { cookie, crumb })
    }
}

// ---------------------------------------------------------------------------
// Response models
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Vec<QuoteSummaryResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QuoteSummaryResult {
    price: Option<Price>,
    summary_profile: Option<SummaryProfile>,
    summary_detail: Option<SummaryDetail>,
    financial_data: Option<FinancialData>,
    default_key_statistics: Option<KeyStatistics>,
}

/// Yahoo wraps numbers as `{"raw": 1.5, "fmt": "1.50"}`, or `{}` when absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawNumber {
    raw: Option<f64>,
}

fn raw(value: Option<&RawNumber>) -> Option<f64> {
    value.and_then(|v| v.raw).filter(|v| v.is_finite())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Price {
    symbol: Option<String>,
    short_name: Option<String>,
    long_name: Option<String>,
    market_cap: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummaryProfile {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryDetail {
    market_cap: Option<RawNumber>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNumber>,
    dividend_yield: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FinancialData {
    total_revenue: Option<RawNumber>,
    return_on_equity: Option<RawNumber>,
    profit_margins: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct KeyStatistics {
    price_to_book: Option<RawNumber>,
    profit_margins: Option<RawNumber>,
}

impl QuoteSummaryResult {
    /// `None` when the result names neither a symbol nor a company.
    fn into_fundamentals(self, symbol: &str) -> Option<CompanyFundamentals> {
        let price = self.price.unwrap_or_default();
        if price.short_name.is_none() && price.symbol.is_none() {
            return None;
        }
        let profile = self.summary_profile.unwrap_or_default();
        let detail = self.summary_detail.unwrap_or_default();
        let financial = self.financial_data.unwrap_or_default();
        let stats = self.default_key_statistics.unwrap_or_default();

        Some(CompanyFundamentals {
            symbol: symbol.to_owned(),
            name: price
                .short_name
                .or(price.long_name)
                .unwrap_or_else(|| symbol.to_owned()),
            sector: profile.sector,
            industry: profile.industry,
            market_cap: raw(price.market_cap.as_ref()).or(raw(detail.market_cap.as_ref())),
            revenue: raw(financial.total_revenue.as_ref()),
            pe_trailing: raw(detail.trailing_pe.as_ref()),
            pb_ratio: raw(stats.price_to_book.as_ref()),
            roe: raw(financial.return_on_equity.as_ref()),
            profit_margin: raw(financial.profit_margins.as_ref())
                .or(raw(stats.profit_margins.as_ref())),
            dividend_yield: raw(detail.dividend_yield.as_ref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> QuoteSummaryResult {
        serde_json::from_value(json).expect("valid quoteSummary result")
    }

    #[test]
    fn maps_all_modules() {
        let result = parse(serde_json::json!({
            "price": {"symbol": "PKO.WA", "shortName": "PKO BP", "marketCap": {"raw": 6.0e10, "fmt": "60B"}},
            "summaryProfile": {"sector": "Financial Services", "industry": "Banks - Regional"},
            "summaryDetail": {"trailingPE": {"raw": 8.5}, "dividendYield": {"raw": 0.07}},
            "financialData": {"totalRevenue": {"raw": 3.0e10}, "returnOnEquity": {"raw": 0.18}, "profitMargins": {"raw": 0.4}},
            "defaultKeyStatistics": {"priceToBook": {"raw": 1.3}}
        }));

        let f = result.into_fundamentals("PKO.WA").expect("fundamentals");
        assert_eq!(f.name, "PKO BP");
        assert_eq!(f.industry.as_deref(), Some("Banks - Regional"));
        assert_eq!(f.market_cap, Some(6.0e10));
        assert_eq!(f.revenue, Some(3.0e10));
        assert_eq!(f.pe_trailing, Some(8.5));
        assert_eq!(f.pb_ratio, Some(1.3));
        assert_eq!(f.roe, Some(0.18));
        assert_eq!(f.profit_margin, Some(0.4));
        assert_eq!(f.dividend_yield, Some(0.07));
    }

    #[test]
    fn empty_number_objects_are_missing() {
        let result = parse(serde_json::json!({
            "price": {"symbol": "XYZ.WA"},
            "summaryDetail": {"trailingPE": {}, "marketCap": {"raw": 1.0e9}}
        }));
        let f = result.into_fundamentals("XYZ.WA").expect("fundamentals");
        assert_eq!(f.name, "XYZ.WA");
        assert_eq!(f.pe_trailing, None);
        assert_eq!(f.market_cap, Some(1.0e9));
    }

    #[test]
    fn result_without_identity_is_dropped() {
        let result = parse(serde_json::json!({"summaryProfile": {"sector": "Energy"}}));
        assert!(result.into_fundamentals("ABC.WA").is_none());
    }
}
