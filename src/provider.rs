//! Provider trait: the seam between the HTTP client and the aggregator.

use async_trait::async_trait;

use crate::{PostRecord, Result, UserRecord};

/// Remote operations the trend aggregator depends on.
///
/// The HTTP search client is the production implementation; tests
/// substitute in-memory fakes.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Searches users matching `query`, returning at most `count` unique
    /// records in provider order.
    async fn search_users(&self, query: &str, count: usize) -> Result<Vec<UserRecord>>;

    /// Fetches up to `count` of the user's most recent posts, newest first.
    async fn recent_posts(&self, handle: &str, count: usize) -> Result<Vec<PostRecord>>;
}
