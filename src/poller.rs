// src/poller.rs
use chrono::Utc;
use metrics::{counter, gauge, histogram};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::dashboard::Dashboard;
use crate::sources::{FeedSource, MetricsSource};

/// What happened to one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// New snapshot stored.
    Stored,
    /// Arrived after a newer tick's result; dropped.
    Stale,
    /// Network/parse failure; previous snapshot kept.
    Failed,
}

impl FetchOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            FetchOutcome::Stored => "stored",
            FetchOutcome::Stale => "stale",
            FetchOutcome::Failed => "failed",
        }
    }
}

/// Refreshes the dashboard's two snapshot slots from their sources.
#[derive(Clone)]
pub struct Poller {
    dashboard: Arc<Dashboard>,
    metrics: Arc<dyn MetricsSource>,
    feed: Arc<dyn FeedSource>,
    seq: Arc<AtomicU64>,
}

impl Poller {
    pub fn new(
        dashboard: Arc<Dashboard>,
        metrics: Arc<dyn MetricsSource>,
        feed: Arc<dyn FeedSource>,
    ) -> Self {
        crate::telemetry::ensure_metrics_described();
        Self {
            dashboard,
            metrics,
            feed,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn dashboard(&self) -> &Arc<Dashboard> {
        &self.dashboard
    }

    /// Allocate the sequence number for a new tick.
    pub fn next_tick(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn refresh_metrics(&self, tick: u64) -> FetchOutcome {
        let name = self.metrics.name();
        let t0 = Instant::now();
        let res = self.metrics.fetch_metrics().await;
        histogram!("dashboard_fetch_ms", "source" => name).record(t0.elapsed().as_secs_f64() * 1e3);

        let outcome = match res {
            Ok(m) => {
                if self.dashboard.offer_metrics(tick, m) {
                    FetchOutcome::Stored
                } else {
                    FetchOutcome::Stale
                }
            }
            Err(e) => {
                tracing::warn!(target: "poller", source = name, tick, error = ?e, "metrics fetch failed");
                FetchOutcome::Failed
            }
        };
        record(name, outcome);
        outcome
    }

    pub async fn refresh_feed(&self, tick: u64) -> FetchOutcome {
        let name = self.feed.name();
        let t0 = Instant::now();
        let res = self.feed.fetch_feed().await;
        histogram!("dashboard_fetch_ms", "source" => name).record(t0.elapsed().as_secs_f64() * 1e3);

        let outcome = match res {
            Ok(items) => {
                let n = items.len();
                if self.dashboard.offer_feed(tick, items) {
                    gauge!("dashboard_feed_items").set(n as f64);
                    FetchOutcome::Stored
                } else {
                    FetchOutcome::Stale
                }
            }
            Err(e) => {
                tracing::warn!(target: "poller", source = name, tick, error = ?e, "feed fetch failed");
                FetchOutcome::Failed
            }
        };
        record(name, outcome);
        outcome
    }

    /// Run one tick's two fetches concurrently and wait for both.
    pub async fn poll_once(&self) -> (FetchOutcome, FetchOutcome) {
        let tick = self.next_tick();
        gauge!("dashboard_last_poll_ts").set(Utc::now().timestamp() as f64);
        tokio::join!(self.refresh_metrics(tick), self.refresh_feed(tick))
    }

    /// Spawn the periodic refresher. Each tick fires both fetches as
    /// independent tasks; neither waits for the other or for the previous tick.
    /// The first tick fires one `period` after spawning; call [`Poller::poll_once`]
    /// beforehand for an initial snapshot.
    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let tick = self.next_tick();
                gauge!("dashboard_last_poll_ts").set(Utc::now().timestamp() as f64);

                let m = self.clone();
                tokio::spawn(async move {
                    m.refresh_metrics(tick).await;
                });
                let f = self.clone();
                tokio::spawn(async move {
                    f.refresh_feed(tick).await;
                });

                tracing::debug!(target: "poller", tick, "poll tick issued");
            }
        })
    }
}

fn record(source: &'static str, outcome: FetchOutcome) {
    counter!("dashboard_fetch_total", "source" => source, "outcome" => outcome.as_str())
        .increment(1);
    if outcome == FetchOutcome::Stale {
        counter!("dashboard_stale_responses_total", "source" => source).increment(1);
        tracing::debug!(target: "poller", source, "dropped stale response");
    }
}
