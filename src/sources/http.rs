// src/sources/http.rs
use anyhow::{Context, Result};
use std::time::Duration;

use super::{FeedSource, MetricsSource};
use crate::model::{FeedItem, FeedResponse, MetricsResponse, MetricsSnapshot};

/// Polls a remote dashboard server's `/metrics` and `/feed`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    metrics_url: String,
    feed_url: String,
}

impl HttpSource {
    pub fn new(metrics_url: impl Into<String>, feed_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("building http client")?;
        Ok(Self {
            client,
            metrics_url: metrics_url.into(),
            feed_url: feed_url.into(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("GET {url} returned {status}");
        }
        let body = resp.text().await.with_context(|| format!("read {url} body"))?;
        serde_json::from_str(&body).with_context(|| format!("parse {url} JSON failed"))
    }
}

#[async_trait::async_trait]
impl MetricsSource for HttpSource {
    async fn fetch_metrics(&self) -> Result<MetricsSnapshot> {
        let r: MetricsResponse = self.get_json(&self.metrics_url).await?;
        Ok(r.metrics)
    }

    fn name(&self) -> &'static str {
        "http-metrics"
    }
}

#[async_trait::async_trait]
impl FeedSource for HttpSource {
    async fn fetch_feed(&self) -> Result<Vec<FeedItem>> {
        let r: FeedResponse = self.get_json(&self.feed_url).await?;
        Ok(r.items)
    }

    fn name(&self) -> &'static str {
        "http-feed"
    }
}
