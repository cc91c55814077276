//! YouTube Data API v3 client.
//!
//! For a tag, finds the most viewed medium-length Polish video published in
//! the week before a reference date and reads up to 100 of its top-level
//! comments.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::SentimentError;
use crate::http::{build_client, decode_json, join, parse_base_url};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Length of the publish window searched for a video.
pub const WINDOW_DAYS: i64 = 7;

/// Top-level comments read per video.
pub const COMMENTS_PER_VIDEO: u32 = 100;

/// Publish-date window for the video search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishWindow {
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
}

impl PublishWindow {
    /// The [`WINDOW_DAYS`] days ending at `end` (its last second), or at
    /// `now` when no end date is given.
    #[must_use]
    pub fn ending(end: Option<NaiveDate>, now: DateTime<Utc>) -> Self {
        let before = match end {
            Some(date) => {
                let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
                Utc.from_utc_datetime(&date.and_time(last_second))
            }
            None => now,
        };
        Self {
            after: before - Duration::days(WINDOW_DAYS),
            before,
        }
    }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// A video found by search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub video_id: String,
    pub title: String,
}

/// A top-level comment with YouTube's comment id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YoutubeComment {
    pub comment_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    #[serde(default)]
    snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchSnippet {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    id: String,
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_display: String,
}

pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl YoutubeClient {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SentimentError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built,
    /// or [`SentimentError::InvalidBaseUrl`] if `base_url` is not a URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, SentimentError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            api_key: api_key.into(),
            base_url: parse_base_url(base_url)?,
        })
    }

    /// The most viewed video for `query` published inside `window`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] on transport failure,
    /// [`SentimentError::UnexpectedStatus`] on a non-success status, or
    /// [`SentimentError::Deserialize`] if the body does not parse.
    pub async fn top_video(
        &self,
        query: &str,
        window: PublishWindow,
    ) -> Result<Option<VideoRef>, SentimentError> {
        let url = join(&self.base_url, "search")?;
        let published_after = rfc3339(window.after);
        let published_before = rfc3339(window.before);
        let response = self
            .client
            .get(url.clone())
            .query(&[
                ("part", "id,snippet"),
                ("q", query),
                ("type", "video"),
                ("publishedAfter", published_after.as_str()),
                ("publishedBefore", published_before.as_str()),
                ("videoDuration", "medium"),
                ("order", "viewCount"),
                ("maxResults", "1"),
                ("relevanceLanguage", "pl"),
                ("regionCode", "PL"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SentimentError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body: SearchResponse = decode_json(response, format!("YouTube search {query}")).await?;
        let video = body.items.into_iter().find_map(|item| {
            item.id.video_id.map(|video_id| VideoRef {
                video_id,
                title: item.snippet.map(|s| s.title).unwrap_or_default(),
            })
        });
        Ok(video)
    }

    /// Up to [`COMMENTS_PER_VIDEO`] top-level comments of a video, as plain
    /// text. Blank comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::CommentsDisabled`] when YouTube answers 403,
    /// [`SentimentError::UnexpectedStatus`] on any other non-success status,
    /// [`SentimentError::Http`] on transport failure, or
    /// [`SentimentError::Deserialize`] if the body does not parse.
    pub async fn top_level_comments(
        &self,
        video_id: &str,
    ) -> Result<Vec<YoutubeComment>, SentimentError> {
        let url = join(&self.base_url, "commentThreads")?;
        let max_results = COMMENTS_PER_VIDEO.to_string();
        let response = self
            .client
            .get(url.clone())
            .query(&[
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", max_results.as_str()),
                ("textFormat", "plainText"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(SentimentError::CommentsDisabled {
                video_id: video_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SentimentError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: CommentThreadsResponse =
            decode_json(response, format!("YouTube comments {video_id}")).await?;
        let comments = body
            .items
            .into_iter()
            .filter_map(|thread| {
                let text = thread
                    .snippet
                    .top_level_comment
                    .snippet
                    .text_display
                    .trim()
                    .to_string();
                (!text.is_empty()).then_some(YoutubeComment {
                    comment_id: thread.id,
                    text,
                })
            })
            .collect();
        Ok(comments)
    }
}
