//! Resolves GPW tickers by scraping bankier.pl share pages.
//!
//! The listing table names each company, and the first word of the name is
//! the slug of its detail page. The detail page carries the exchange ticker
//! in a "Ticker GPW" table row.

use percent_encoding::utf8_percent_encode;
use regex::Regex;
use reqwest::{Client, Url};

use crate::error::ScraperError;
use crate::http;

const DEFAULT_BASE_URL: &str = "https://www.bankier.pl/";
const LISTING_PATH: &str = "gielda/notowania/akcje";
const TICKER_ROW_LABEL: &str = "Ticker GPW";

/// Suffix Yahoo Finance uses for Warsaw-listed symbols.
pub const WARSAW_SUFFIX: &str = ".WA";

pub struct BankierClient {
    client: Client,
    base_url: Url,
}

impl BankierClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ScraperError::InvalidBaseUrl`] if `base_url` is invalid.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            client: http::build_client(timeout_secs, user_agent)?,
            base_url: http::parse_base_url(base_url)?,
        })
    }

    /// Slugs of every company in the share listing.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the listing cannot be fetched.
    pub async fn list_company_slugs(&self) -> Result<Vec<String>, ScraperError> {
        let url = http::join(&self.base_url, LISTING_PATH)?;
        let html = self.fetch_html(&url).await?;
        Ok(parse_listing_slugs(&html))
    }

    /// Ticker of the company behind `slug`, or `None` if its page has no
    /// "Ticker GPW" row.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the page cannot be fetched.
    pub async fn fetch_ticker(&self, slug: &str) -> Result<Option<String>, ScraperError> {
        let encoded = utf8_percent_encode(slug, http::PATH_SEGMENT);
        let url = http::join(
            &self.base_url,
            &format!("{LISTING_PATH}/{encoded}/podstawowe-dane"),
        )?;
        let html = self.fetch_html(&url).await?;
        Ok(parse_ticker(&html))
    }

    /// Yahoo symbol (`<TICKER>.WA`) of the company behind `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the page cannot be fetched.
    pub async fn resolve_symbol(&self, slug: &str) -> Result<Option<String>, ScraperError> {
        Ok(self
            .fetch_ticker(slug)
            .await?
            .map(|ticker| format!("{ticker}{WARSAW_SUFFIX}")))
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, ScraperError> {
        let request = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "text/html")
            .header(reqwest::header::ACCEPT_LANGUAGE, "pl-PL,pl;q=0.9");
        let response = http::send(request, url).await?;
        Ok(response.text().await?)
    }
}

/// First word of the first cell of every data row in the page's first table.
#[must_use]
pub fn parse_listing_slugs(html: &str) -> Vec<String> {
    let Some(table) = first_table(html) else {
        return Vec::new();
    };
    table_rows(table)
        .into_iter()
        .filter_map(|cells| cells.into_iter().next())
        .filter_map(|name| name.split_whitespace().next().map(str::to_owned))
        .collect()
}

/// Value cell of the "Ticker GPW" row, if any table on the page has one.
#[must_use]
pub fn parse_ticker(html: &str) -> Option<String> {
    table_rows(html)
        .into_iter()
        .find(|cells| {
            cells
                .first()
                .is_some_and(|label| label.contains(TICKER_ROW_LABEL))
        })
        .and_then(|cells| cells.into_iter().nth(1))
        .filter(|ticker| !ticker.is_empty())
}

fn first_table(html: &str) -> Option<&str> {
    let re = Regex::new(r"(?is)<table\b.*?</table>").expect("valid regex");
    re.find(html).map(|m| m.as_str())
}

/// Text of the `<td>`/`<th>` cells of every `<tr>` that has at least one
/// `<td>`. Header-only rows are skipped.
fn table_rows(html: &str) -> Vec<Vec<String>> {
    let row_re = Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("valid regex");
    let cell_re = Regex::new(r"(?is)<t([dh])\b[^>]*>(.*?)</t[dh]>").expect("valid regex");

    row_re
        .captures_iter(html)
        .filter_map(|row| {
            let inner = row.get(1)?.as_str();
            let mut has_data_cell = false;
            let cells: Vec<String> = cell_re
                .captures_iter(inner)
                .map(|cell| {
                    if cell.get(1).is_some_and(|k| k.as_str().eq_ignore_ascii_case("d")) {
                        has_data_cell = true;
                    }
                    cell_text(cell.get(2).map_or("", |m| m.as_str()))
                })
                .collect();
            has_data_cell.then_some(cells)
        })
        .collect()
}

fn cell_text(fragment: &str) -> String {
    let tag_re = Regex::new(r"(?s)<[^>]+>").expect("valid regex");
    let text = tag_re.replace_all(fragment, " ");
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
