use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::SentimentError;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, SentimentError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, SentimentError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| SentimentError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url, SentimentError> {
    base.join(path).map_err(|e| SentimentError::InvalidBaseUrl {
        base_url: base.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: Response,
    context: impl Into<String>,
) -> Result<T, SentimentError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| SentimentError::Deserialize {
        context: context.into(),
        source: e,
    })
}
