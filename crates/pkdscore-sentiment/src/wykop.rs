//! Wykop API v3 client and the per-tag collection budget.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::http::{build_client, decode_json, join, parse_base_url};

const DEFAULT_BASE_URL: &str = "https://wykop.pl/api/v3/";

/// New posts stored per tag before moving on.
pub const TARGET_POSTS_PER_TAG: usize = 300;

/// Consecutive empty stream pages that end a tag.
pub const MAX_EMPTY_PAGES: usize = 3;

/// Upper bound on stream pages read per tag.
pub const MAX_PAGES: u32 = 100;

/// Tag name as Wykop expects it in a path: Polish letters transliterated to
/// ASCII, lowercased, spaces removed.
#[must_use]
pub fn clean_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'ą' | 'Ą' => 'a',
            'ć' | 'Ć' => 'c',
            'ę' | 'Ę' => 'e',
            'ł' | 'Ł' => 'l',
            'ń' | 'Ń' => 'n',
            'ó' | 'Ó' => 'o',
            'ś' | 'Ś' => 's',
            'ź' | 'Ź' | 'ż' | 'Ż' => 'z',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    data: AuthCredentials<'a>,
}

#[derive(Debug, Serialize)]
struct AuthCredentials<'a> {
    key: &'a str,
    secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    data: AuthToken,
}

#[derive(Debug, Deserialize)]
struct AuthToken {
    token: String,
}

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    data: Vec<WykopEntry>,
}

/// One entry of a tag stream.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WykopEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub source: Option<EntrySource>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EntrySource {
    #[serde(default)]
    pub label: Option<String>,
}

impl WykopEntry {
    /// The entry body, falling back to the linked source's label.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        let content = self.content.as_deref().map(str::trim).filter(|c| !c.is_empty());
        content.or_else(|| {
            self.source
                .as_ref()
                .and_then(|s| s.label.as_deref())
                .map(str::trim)
                .filter(|l| !l.is_empty())
        })
    }
}

pub struct WykopClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl WykopClient {
    /// Authenticate with an application key and secret.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::WykopAuth`] if Wykop rejects the
    /// credentials, or [`SentimentError::Http`] on transport failure.
    pub async fn login(
        key: &str,
        secret: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SentimentError> {
        Self::login_with_base_url(key, secret, timeout_secs, user_agent, DEFAULT_BASE_URL).await
    }

    /// # Errors
    ///
    /// See [`WykopClient::login`]; also returns
    /// [`SentimentError::InvalidBaseUrl`] if `base_url` is not a URL.
    pub async fn login_with_base_url(
        key: &str,
        secret: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, SentimentError> {
        let client = build_client(timeout_secs, user_agent)?;
        let base_url = parse_base_url(base_url)?;

        let url = join(&base_url, "auth")?;
        let response = client
            .post(url)
            .json(&AuthRequest {
                data: AuthCredentials { key, secret },
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentimentError::WykopAuth(format!("HTTP {status}: {body}")));
        }

        let auth: AuthResponse = decode_json(response, "Wykop auth").await?;
        tracing::debug!("Wykop token acquired");
        Ok(Self {
            client,
            base_url,
            token: auth.data.token,
        })
    }

    /// One page of a tag's entry stream, all-time sort.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::UnexpectedStatus`] on a non-success status,
    /// [`SentimentError::Http`] on transport failure, or
    /// [`SentimentError::Deserialize`] if the body does not parse.
    pub async fn tag_stream(&self, tag: &str, page: u32) -> Result<Vec<WykopEntry>, SentimentError> {
        let cleaned = clean_tag(tag);
        let path = format!(
            "tags/{}/stream",
            percent_encoding::utf8_percent_encode(&cleaned, percent_encoding::NON_ALPHANUMERIC)
        );
        let url = join(&self.base_url, &path)?;
        let page = page.to_string();
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .query(&[("page", page.as_str()), ("sort", "all")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SentimentError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body: StreamResponse = decode_json(response, format!("Wykop stream {cleaned}")).await?;
        Ok(body.data)
    }
}

/// Stopping rule for collecting one tag's stream.
///
/// Collection ends once `target` new posts are stored, after
/// `max_empty` consecutive empty pages, or after [`MAX_PAGES`] pages.
#[derive(Debug, Clone)]
pub struct StreamBudget {
    target: usize,
    max_empty: usize,
    stored: usize,
    empty_streak: usize,
    pages: u32,
}

impl Default for StreamBudget {
    fn default() -> Self {
        Self::new(TARGET_POSTS_PER_TAG, MAX_EMPTY_PAGES)
    }
}

impl StreamBudget {
    #[must_use]
    pub fn new(target: usize, max_empty: usize) -> Self {
        Self {
            target,
            max_empty,
            stored: 0,
            empty_streak: 0,
            pages: 0,
        }
    }

    /// Record a fetched page with `entries` entries. Failed fetches count as
    /// empty pages.
    pub fn record_page(&mut self, entries: usize) {
        self.pages += 1;
        if entries == 0 {
            self.empty_streak += 1;
        } else {
            self.empty_streak = 0;
        }
    }

    pub fn record_stored(&mut self) {
        self.stored += 1;
    }

    #[must_use]
    pub fn target_reached(&self) -> bool {
        self.stored >= self.target
    }

    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.target_reached() || self.empty_streak >= self.max_empty || self.pages >= MAX_PAGES
    }

    #[must_use]
    pub fn stored(&self) -> usize {
        self.stored
    }

    /// Page number to fetch next, starting at 1.
    #[must_use]
    pub fn next_page(&self) -> u32 {
        self.pages + 1
    }
}
