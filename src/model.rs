//! # Wire model
//! Shapes served by `/metrics` and `/feed` and consumed by the leaderboard.
//!
//! Field names follow the JSON contract (camelCase). `type` and `platform`
//! only accept their fixed enumerations; anything else fails to parse.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Four aggregate counters. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub mentions: u64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub positive_sentiment: u32,
    #[serde(default)]
    pub engagements: u64,
}

/// `GET /metrics` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub metrics: MetricsSnapshot,
}

/// Provenance category of a feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Earned,
    Creator,
    Exec,
    Owned,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Earned,
        Category::Creator,
        Category::Exec,
        Category::Owned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Earned => "Earned",
            Category::Creator => "Creator",
            Category::Exec => "Exec",
            Category::Owned => "Owned",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    X,
    Nostr,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::X => "X",
            Platform::Nostr => "Nostr",
            Platform::Web => "Web",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

/// Per-item counters. Any subset may be present; absent ones count as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeedMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposts: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<u64>,
}

/// One unit of media coverage. Never mutated after it is received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub platform: Platform,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    pub title: String,
    pub url: String,
    /// ISO-8601 instant; may be empty or garbage in degenerate inputs.
    #[serde(default, rename = "timestampISO")]
    pub timestamp_iso: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub metrics: FeedMetrics,
}

impl FeedItem {
    /// Display name: `sourceName`, falling back to `authorName`.
    pub fn source_label(&self) -> &str {
        self.source_name.as_deref().unwrap_or(&self.author_name)
    }
}

/// `GET /feed` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeedResponse {
    #[serde(default)]
    pub items: Vec<FeedItem>,
}
