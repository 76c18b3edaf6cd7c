// src/sources/fixture.rs
use anyhow::{Context, Result};
use std::path::Path;

use super::FeedSource;
use crate::model::{FeedItem, FeedResponse};

/// Serves a pre-recorded list of items unmodified.
#[derive(Debug, Clone, Default)]
pub struct StaticFeedSource {
    items: Vec<FeedItem>,
}

// Accept either the `/feed` envelope or a bare array.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum FixtureAny {
    Wrapped(FeedResponse),
    Bare(Vec<FeedItem>),
}

impl StaticFeedSource {
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self { items }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let any: FixtureAny = serde_json::from_str(s).context("parsing feed fixture json")?;
        let items = match any {
            FixtureAny::Wrapped(r) => r.items,
            FixtureAny::Bare(v) => v,
        };
        Ok(Self { items })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading feed fixture from {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }
}

#[async_trait::async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch_feed(&self) -> Result<Vec<FeedItem>> {
        Ok(self.items.clone())
    }

    fn name(&self) -> &'static str {
        "static-feed"
    }
}
