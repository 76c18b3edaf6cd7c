// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod model;
pub mod pipeline;
pub mod poller;
pub mod sources;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::DashboardConfig;
pub use crate::dashboard::{Dashboard, DashboardView};
pub use crate::pipeline::{compute_view, DisplayRow, Filter, SortKey, ViewState};
pub use crate::poller::Poller;

use std::sync::Arc;

use axum::Router;

use crate::sources::{FeedSource, MockFeedSource, MockMetricsSource, StaticFeedSource};

/// Wire the router and the in-process poller over the mock sources, or over
/// a pre-recorded feed when `feed_fixture` is set.
/// The poller is returned unstarted; the caller decides when to spawn it.
pub fn build(cfg: &DashboardConfig) -> anyhow::Result<(Router, Poller)> {
    // Recorder first, so metric descriptions land on it.
    let debug = if telemetry::debug_routes_enabled() {
        Some(telemetry::Metrics::init()?)
    } else {
        None
    };

    let dashboard = Arc::new(Dashboard::new(cfg.timestamp_policy()));
    let metrics_source = Arc::new(MockMetricsSource::new());
    let feed_source: Arc<dyn FeedSource> = match &cfg.feed_fixture {
        Some(path) => Arc::new(StaticFeedSource::from_path(path)?),
        None => Arc::new(MockFeedSource::new(cfg.feed_size)),
    };
    tracing::info!(target: "startup", feed = feed_source.name(), "feed source selected");

    let poller = Poller::new(dashboard.clone(), metrics_source.clone(), feed_source.clone());

    let mut app = api::router(AppState {
        dashboard,
        metrics_source,
        feed_source,
    });
    if let Some(m) = debug {
        app = app.merge(m.router());
    }

    Ok((app, poller))
}

/// Full in-process app: config from disk/env, one initial poll, then the
/// periodic poller in the background.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = DashboardConfig::load_default()?;
    let (router, poller) = build(&cfg)?;

    let (m, f) = poller.poll_once().await;
    tracing::info!(metrics = ?m, feed = ?f, "initial snapshot");

    poller.spawn(cfg.poll_interval());
    Ok(router)
}
