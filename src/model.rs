//! User and content data types.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Snapshot of a provider user at fetch time.
///
/// Identity is the handle alone: two records with the same handle compare
/// equal even if follower counts differ between fetches.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    /// Unique handle within a search response (without the leading `@`).
    pub handle: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Follower count at fetch time.
    pub follower_count: u64,
    /// The provider's unmodified user object.
    pub raw: Value,
}

impl PartialEq for UserRecord {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for UserRecord {}

impl Hash for UserRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

/// A raw timeline entry before it is joined to its author.
#[derive(Debug, Clone, Serialize)]
pub struct PostRecord {
    /// Provider-assigned post id.
    pub id: u64,
    /// Post text, untruncated.
    pub text: String,
    /// Publication time.
    pub created_at: DateTime<Utc>,
}

/// A single entry in an aggregated trending feed.
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    /// Handle of the post author. Always matches `source_user.handle`.
    pub author_handle: String,
    /// Post text, untruncated.
    pub text: String,
    /// Publication time, the primary ordering key.
    pub posted_at: DateTime<Utc>,
    /// The author record from the same aggregation pass.
    #[serde(skip)]
    pub source_user: Arc<UserRecord>,
}
