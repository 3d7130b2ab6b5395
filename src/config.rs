//! Client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the provider API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the provider API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Bearer token attached to requests when present.
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Users requested per search page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Provider-imposed ceiling on a single user search.
    #[serde(default = "default_max_search_count")]
    pub max_search_count: usize,
}

fn default_api_base() -> String {
    "https://api.twitter.com/1.1".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; trendscope/0.1)".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_page_size() -> usize {
    20
}

fn default_max_search_count() -> usize {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            bearer_token: None,
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            page_size: default_page_size(),
            max_search_count: default_max_search_count(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with the default provider endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the per-request timeout in seconds.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}
