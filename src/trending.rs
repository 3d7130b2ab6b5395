//! Trending content aggregation.
//!
//! Builds a bounded, recency-sorted feed by discovering users for a seed
//! query and merging their recent posts.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::provider::Provider;
use crate::{ClientError, ContentItem, Result, UserRecord};

/// Tunable aggregation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPolicy {
    /// Ratio of users fetched to content items requested, compensating for
    /// users with no recent posts.
    #[serde(default = "default_oversampling_factor")]
    pub oversampling_factor: usize,
    /// Posts fetched per candidate user.
    #[serde(default = "default_posts_per_user")]
    pub posts_per_user: usize,
    /// Maximum concurrent per-user fetches.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_oversampling_factor() -> usize {
    3
}

fn default_posts_per_user() -> usize {
    5
}

fn default_max_concurrency() -> usize {
    4
}

impl Default for TrendPolicy {
    fn default() -> Self {
        Self {
            oversampling_factor: default_oversampling_factor(),
            posts_per_user: default_posts_per_user(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Aggregates recent posts from users discovered for a seed query.
pub struct TrendAggregator {
    provider: Arc<dyn Provider>,
    policy: TrendPolicy,
}

impl TrendAggregator {
    /// Creates an aggregator over the given provider with the default
    /// policy.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            policy: TrendPolicy::default(),
        }
    }

    /// Sets the aggregation policy.
    pub fn with_policy(mut self, policy: TrendPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds a trending feed of at most `limit` items for `seed_query`.
    ///
    /// Users are oversampled relative to `limit`, each user's recent posts
    /// are fetched concurrently, and the merged feed is sorted by recency
    /// (newest first) with follower count breaking ties. A user whose
    /// fetch fails is skipped; finding no users or no posts yields an
    /// empty feed, not an error.
    pub async fn get_trending_content_via_users(
        &self,
        seed_query: &str,
        limit: usize,
    ) -> Result<Vec<ContentItem>> {
        if limit == 0 {
            return Err(ClientError::InvalidQuery(
                "limit must be positive".to_string(),
            ));
        }

        let user_count = limit.saturating_mul(self.policy.oversampling_factor.max(1));
        let users = self.provider.search_users(seed_query, user_count).await?;
        if users.is_empty() {
            debug!("No candidate users for '{}'", seed_query);
            return Ok(Vec::new());
        }

        let users: Vec<Arc<UserRecord>> = users.into_iter().map(Arc::new).collect();
        debug!("Fetching posts from {} candidate users", users.len());

        let posts_per_user = self.policy.posts_per_user;
        let fetches = users.into_iter().map(|user| {
            let provider = Arc::clone(&self.provider);
            async move {
                match provider.recent_posts(&user.handle, posts_per_user).await {
                    Ok(posts) => Some((user, posts)),
                    Err(e) => {
                        warn!("Skipping user @{}: {}", user.handle, e);
                        None
                    }
                }
            }
        });

        let fetched: Vec<_> = stream::iter(fetches)
            .buffer_unordered(self.policy.max_concurrency.max(1))
            .collect()
            .await;

        let mut items: Vec<ContentItem> = fetched
            .into_iter()
            .flatten()
            .flat_map(|(user, posts)| {
                posts.into_iter().map(move |post| ContentItem {
                    author_handle: user.handle.clone(),
                    text: post.text,
                    posted_at: post.created_at,
                    source_user: Arc::clone(&user),
                })
            })
            .collect();

        // Recency first, follower count on ties; the final handle tiebreak
        // keeps the output independent of fetch completion order.
        items.sort_by(|a, b| {
            b.posted_at
                .cmp(&a.posted_at)
                .then_with(|| b.source_user.follower_count.cmp(&a.source_user.follower_count))
                .then_with(|| a.author_handle.cmp(&b.author_handle))
        });
        items.truncate(limit);

        Ok(items)
    }
}
