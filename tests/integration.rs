//! Integration tests for the proxy-aware client.
//!
//! The `live` module talks to the real provider and is `#[ignore]`d by
//! default because it requires network access (and a bearer token for the
//! authenticated endpoints).
//!
//! Run with: `cargo test --test integration -- --ignored`

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use trendscope::{
    ClientError, PostRecord, Provider, Result, TrendAggregator, TrendPolicy, UserRecord,
};

/// A scripted provider covering the aggregation scenarios end to end.
struct ScriptedProvider {
    users: Vec<UserRecord>,
    timelines: HashMap<String, Vec<PostRecord>>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            users: Vec::new(),
            timelines: HashMap::new(),
        }
    }

    fn user(mut self, handle: &str, followers: u64, posts: Vec<PostRecord>) -> Self {
        self.users.push(UserRecord {
            handle: handle.to_string(),
            display_name: handle.to_string(),
            follower_count: followers,
            raw: serde_json::json!({"screen_name": handle}),
        });
        self.timelines.insert(handle.to_string(), posts);
        self
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn search_users(&self, query: &str, count: usize) -> Result<Vec<UserRecord>> {
        if query.trim().is_empty() {
            return Err(ClientError::InvalidQuery("empty query".to_string()));
        }
        Ok(self.users.iter().take(count).cloned().collect())
    }

    async fn recent_posts(&self, handle: &str, count: usize) -> Result<Vec<PostRecord>> {
        match self.timelines.get(handle) {
            Some(posts) => Ok(posts.iter().take(count).cloned().collect()),
            None => Err(ClientError::TransientFetch(format!(
                "no timeline for {}",
                handle
            ))),
        }
    }
}

fn post(id: u64, text: &str, hour: u32) -> PostRecord {
    PostRecord {
        id,
        text: text.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn trending_scenario_five_users_three_posts() {
    let mut provider = ScriptedProvider::new();
    for i in 0..5u64 {
        let handle = format!("user{}", i);
        let posts = (0..3)
            .map(|j| post(i * 10 + j, &format!("post {} from {}", j, handle), (i * 3 + j) as u32 % 24))
            .collect();
        provider = provider.user(&handle, i * 100, posts);
    }

    let aggregator = TrendAggregator::new(Arc::new(provider));
    let items = aggregator
        .get_trending_content_via_users("tesla", 10)
        .await
        .unwrap();

    assert_eq!(items.len(), 10, "min(limit, total posts) items expected");
    for pair in items.windows(2) {
        assert!(
            pair[0].posted_at >= pair[1].posted_at,
            "feed must be sorted newest first"
        );
        if pair[0].posted_at == pair[1].posted_at {
            assert!(
                pair[0].source_user.follower_count >= pair[1].source_user.follower_count,
                "ties must be broken by follower count"
            );
        }
    }
}

#[tokio::test]
async fn trending_scenario_no_orphaned_items() {
    let provider = ScriptedProvider::new()
        .user("a", 10, vec![post(1, "one", 1)])
        .user("b", 20, vec![post(2, "two", 2)]);

    let aggregator = TrendAggregator::new(Arc::new(provider));
    let items = aggregator
        .get_trending_content_via_users("anything", 10)
        .await
        .unwrap();

    for item in &items {
        assert_eq!(item.author_handle, item.source_user.handle);
    }
}

#[tokio::test]
async fn trending_scenario_policy_is_respected() {
    let provider = ScriptedProvider::new().user(
        "prolific",
        1,
        (0..10).map(|j| post(j, "t", j as u32 % 24)).collect(),
    );

    let aggregator = TrendAggregator::new(Arc::new(provider)).with_policy(TrendPolicy {
        posts_per_user: 2,
        ..Default::default()
    });
    let items = aggregator
        .get_trending_content_via_users("anything", 10)
        .await
        .unwrap();

    assert_eq!(items.len(), 2, "per-user post cap must hold");
}

mod live {
    use trendscope::{ClientConfig, ConnectivityProbe, ProxyResolver, SearchClient};

    #[tokio::test]
    #[ignore]
    async fn live_connectivity_probe() {
        let config = ClientConfig::default();
        let candidates = ProxyResolver::new().detect_proxy_settings();
        let probe =
            ConnectivityProbe::new(format!("{}/help/configuration.json", config.api_base));

        let result = probe.test_connection(&candidates).await;
        println!(
            "reachable={} proxy={:?} latency={:?}",
            result.reachable, result.proxy_used, result.latency_ms
        );
    }

    #[tokio::test]
    #[ignore]
    async fn live_user_search() {
        let config = ClientConfig::default()
            .with_bearer_token(std::env::var("TWITTER_BEARER_TOKEN").unwrap_or_default());
        let client = SearchClient::new(config, None).unwrap();

        match client.search_users("tesla", 5).await {
            Ok(users) => {
                println!("search returned {} users", users.len());
                for user in users.iter().take(3) {
                    println!("  @{} - {} followers", user.handle, user.follower_count);
                }
            }
            Err(e) => println!("search failed: {}", e),
        }
    }
}
