//! Client for the CEIDG v3 business registry API
//! (`dane.biznes.gov.pl/api/ceidg/v3`).

mod export;
mod types;

use chrono::NaiveDate;
use rand::seq::index::sample;
use reqwest::{Client, StatusCode, Url};

use crate::error::ScraperError;
use crate::http;

pub use export::{csv_file_name, newest_firms_csv, parse_csv_timestamp, read_firms_csv, write_firms_csv};
pub use types::{FirmDetail, FirmRecord, FirmRef, FirmSearchPage};

const DEFAULT_BASE_URL: &str = "https://dane.biznes.gov.pl/api/ceidg/v3/";

/// Firms returned per search page.
pub const PAGE_SIZE: u64 = 25;
/// Number of random search pages sampled per collection run.
pub const PAGE_SAMPLE_SIZE: usize = 20;

pub struct CeidgClient {
    client: Client,
    token: String,
    base_url: Url,
}

impl CeidgClient {
    /// Creates a client pointed at the production registry.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(token: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        Self::with_base_url(token, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ScraperError::InvalidBaseUrl`] if `base_url` is invalid.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            client: http::build_client(timeout_secs, user_agent)?,
            token: token.to_owned(),
            base_url: http::parse_base_url(base_url)?,
        })
    }

    /// Fetches one page of firms that started on or after `started_from`.
    ///
    /// A `204 No Content` response is an empty page.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] on transport failure, a non-2xx status, or an
    /// unparseable body.
    pub async fn search_page(
        &self,
        started_from: NaiveDate,
        page: u64,
    ) -> Result<FirmSearchPage, ScraperError> {
        let mut url = http::join(&self.base_url, "firmy")?;
        url.query_pairs_mut()
            .append_pair("limit", &PAGE_SIZE.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("dataod", &started_from.format("%Y-%m-%d").to_string());

        let response = http::send(self.get(&url), &url).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(FirmSearchPage::default());
        }
        http::decode_json(response, format!("CEIDG firmy page {page}")).await
    }

    /// Fetches the details of one firm, or `None` when the registry returns
    /// no record for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] on transport failure, a non-2xx status, or an
    /// unparseable body.
    pub async fn firm_details(&self, id: &str) -> Result<Option<FirmDetail>, ScraperError> {
        let mut url = http::join(&self.base_url, "firma/")?;
        url.path_segments_mut()
            .map_err(|()| ScraperError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: "cannot be a base".to_owned(),
            })?
            .pop_if_empty()
            .push(id);

        let response = http::send(self.get(&url), &url).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body: types::FirmDetailResponse =
            http::decode_json(response, format!("CEIDG firma {id}")).await?;
        Ok(body.firma.into_iter().next())
    }

    fn get(&self, url: &Url) -> reqwest::RequestBuilder {
        self.client
            .get(url.clone())
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

/// Number of search pages needed for `count` firms.
#[must_use]
pub fn page_count(count: u64) -> u64 {
    count.div_ceil(PAGE_SIZE)
}

/// Pick up to [`PAGE_SAMPLE_SIZE`] distinct random page indices out of
/// `total_pages`. All pages are returned, in order, when there are fewer.
#[must_use]
pub fn sample_pages(total_pages: u64) -> Vec<u64> {
    let total = usize::try_from(total_pages).unwrap_or(usize::MAX);
    if total <= PAGE_SAMPLE_SIZE {
        return (0..total_pages).collect();
    }
    let mut rng = rand::rng();
    sample(&mut rng, total, PAGE_SAMPLE_SIZE)
        .into_iter()
        .map(|i| i as u64)
        .collect()
}
