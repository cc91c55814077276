//! Shared request plumbing for the JSON clients.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ScraperError;

/// Characters escaped in a single path segment; unreserved ones stay as-is.
pub(crate) const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~');

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ScraperError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parse `base_url`, forcing exactly one trailing slash so that
/// [`Url::join`] appends to the path instead of replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ScraperError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url, ScraperError> {
    base.join(path).map_err(|e| ScraperError::InvalidBaseUrl {
        base_url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Send `request` and map the non-2xx statuses to typed errors.
pub(crate) async fn send(request: RequestBuilder, url: &Url) -> Result<Response, ScraperError> {
    let response = request.send().await?;
    check_status(response, url)
}

pub(crate) fn check_status(response: Response, url: &Url) -> Result<Response, ScraperError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ScraperError::RateLimited {
            domain: url.host_str().unwrap_or_default().to_owned(),
            retry_after_secs,
        });
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ScraperError::NotFound {
            url: url.to_string(),
        });
    }

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response)
}

pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: Response,
    context: impl Into<String>,
) -> Result<T, ScraperError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
        context: context.into(),
        source: e,
    })
}
