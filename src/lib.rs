//! # trendscope
//!
//! A proxy-aware client for a social data provider, covering proxy
//! discovery, connectivity verification, paginated user search, and
//! trending-content aggregation.
//!
//! The pieces compose explicitly: the resolver produces ranked proxy
//! candidates, the probe picks the first working one, and the selected
//! configuration is handed to the search client. No global proxy state.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trendscope::{
//!     ClientConfig, ConnectivityProbe, ProxyResolver, SearchClient, TrendAggregator,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::default();
//!
//!     let candidates = ProxyResolver::new().detect_proxy_settings();
//!     let probe = ConnectivityProbe::new(format!("{}/help/configuration.json", config.api_base));
//!     let connectivity = probe.test_connection(&candidates).await;
//!
//!     let client = SearchClient::new(config, connectivity.proxy_used)?;
//!     let aggregator = TrendAggregator::new(Arc::new(client));
//!
//!     for item in aggregator.get_trending_content_via_users("tesla", 10).await? {
//!         println!("@{}: {}", item.author_handle, item.text);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod model;
mod probe;
mod provider;
mod search;
mod trending;

pub mod proxy;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use model::{ContentItem, PostRecord, UserRecord};
pub use probe::{ConnectivityProbe, ConnectivityResult, LatencyClass};
pub use provider::Provider;
pub use proxy::{ProxyConfig, ProxyResolver, ProxyScheme};
pub use search::SearchClient;
pub use trending::{TrendAggregator, TrendPolicy};
