//! User search and timeline fetching over the selected proxy.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::provider::Provider;
use crate::proxy::{build_http_client, ProxyConfig};
use crate::{ClientConfig, ClientError, PostRecord, Result, UserRecord};

/// Provider-imposed ceiling on a single timeline request.
const MAX_TIMELINE_COUNT: usize = 200;

/// HTTP client for the provider's user-search and user-timeline endpoints.
///
/// The proxy configuration selected by the connectivity probe is passed in
/// explicitly at construction; there is no ambient client state.
pub struct SearchClient {
    client: Client,
    config: ClientConfig,
}

impl SearchClient {
    /// Creates a client routing requests through `proxy` (or directly when
    /// `None`).
    pub fn new(config: ClientConfig, proxy: Option<ProxyConfig>) -> Result<Self> {
        let client = build_http_client(
            proxy.as_ref(),
            &config.user_agent,
            Duration::from_secs(config.timeout),
        )?;
        Ok(Self { client, config })
    }

    /// Searches users matching `query`.
    ///
    /// Pages through results until `count` unique users are gathered or the
    /// provider runs out. `count` is clamped to the configured maximum;
    /// duplicates across pages are dropped, first occurrence wins.
    pub async fn search_users(&self, query: &str, count: usize) -> Result<Vec<UserRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }
        if count == 0 {
            return Err(ClientError::InvalidQuery(
                "count must be positive".to_string(),
            ));
        }
        let count = count.min(self.config.max_search_count);

        let mut users: Vec<UserRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page: u32 = 1;

        loop {
            let url = format!(
                "{}/users/search.json?q={}&count={}&page={}",
                self.config.api_base,
                urlencoding::encode(query),
                self.config.page_size,
                page
            );

            let values = self.get_json_array(&url).await?;
            let fetched = values.len();
            let before = users.len();

            for value in values {
                if users.len() == count {
                    break;
                }
                let user = user_from_value(value)?;
                if seen.insert(user.handle.clone()) {
                    users.push(user);
                }
            }

            debug!(
                "Search page {} returned {} users ({} unique so far)",
                page,
                fetched,
                users.len()
            );

            if users.len() == count || fetched < self.config.page_size || users.len() == before {
                break;
            }
            page += 1;
        }

        Ok(users)
    }

    /// Fetches up to `count` of the user's most recent posts.
    pub async fn recent_posts(&self, handle: &str, count: usize) -> Result<Vec<PostRecord>> {
        let handle = handle.trim().trim_start_matches('@');
        if handle.is_empty() {
            return Err(ClientError::InvalidQuery(
                "handle must not be empty".to_string(),
            ));
        }
        if count == 0 {
            return Err(ClientError::InvalidQuery(
                "count must be positive".to_string(),
            ));
        }
        let count = count.min(MAX_TIMELINE_COUNT);

        let url = format!(
            "{}/statuses/user_timeline.json?screen_name={}&count={}",
            self.config.api_base,
            urlencoding::encode(handle),
            count
        );

        let values = self.get_json_array(&url).await?;
        values.into_iter().map(post_from_value).collect()
    }

    /// Issues a GET and maps the response into the error taxonomy.
    async fn get_json_array(&self, url: &str) -> Result<Vec<Value>> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ClientError::RateLimit { retry_after });
        }
        if status.is_server_error() {
            return Err(ClientError::TransientFetch(format!(
                "provider returned {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                code: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::Parse(format!("expected JSON array: {}", e)))
    }
}

#[async_trait]
impl Provider for SearchClient {
    async fn search_users(&self, query: &str, count: usize) -> Result<Vec<UserRecord>> {
        SearchClient::search_users(self, query, count).await
    }

    async fn recent_posts(&self, handle: &str, count: usize) -> Result<Vec<PostRecord>> {
        SearchClient::recent_posts(self, handle, count).await
    }
}

fn user_from_value(value: Value) -> Result<UserRecord> {
    let handle = value
        .get("screen_name")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::Parse("user object missing screen_name".to_string()))?
        .to_string();
    let display_name = value
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| handle.clone());
    let follower_count = value
        .get("followers_count")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Ok(UserRecord {
        handle,
        display_name,
        follower_count,
        raw: value,
    })
}

fn post_from_value(value: Value) -> Result<PostRecord> {
    let id = value
        .get("id")
        .and_then(Value::as_u64)
        .or_else(|| {
            value
                .get("id_str")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
        })
        .ok_or_else(|| ClientError::Parse("post object missing id".to_string()))?;
    let text = value
        .get("text")
        .or_else(|| value.get("full_text"))
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::Parse("post object missing text".to_string()))?
        .to_string();
    let created_at = value
        .get("created_at")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::Parse("post object missing created_at".to_string()))
        .and_then(parse_created_at)?;

    Ok(PostRecord {
        id,
        text,
        created_at,
    })
}

/// Parses the provider's legacy timestamp format
/// (`Wed Oct 10 20:19:24 +0000 2018`), falling back to RFC 3339.
fn parse_created_at(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ClientError::Parse(format!("invalid created_at '{}': {}", raw, e)))
}
