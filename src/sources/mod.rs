// src/sources/mod.rs
pub mod fixture;
pub mod http;
pub mod mock;

use anyhow::Result;

use crate::model::{FeedItem, MetricsSnapshot};

pub use fixture::StaticFeedSource;
pub use http::HttpSource;
pub use mock::{MockFeedSource, MockMetricsSource};

/// Anything that can hand out a fresh aggregate snapshot.
#[async_trait::async_trait]
pub trait MetricsSource: Send + Sync {
    async fn fetch_metrics(&self) -> Result<MetricsSnapshot>;
    fn name(&self) -> &'static str;
}

/// Anything that can hand out the current feed list.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self) -> Result<Vec<FeedItem>>;
    fn name(&self) -> &'static str;
}
