//! Terminal leaderboard: polls a running dashboard's `/metrics` and `/feed`
//! and prints the ranked table on every refresh.
//!
//! Controls come from the environment:
//! `LEADERBOARD_FILTER` (All/Earned/Creator/Exec/Owned),
//! `LEADERBOARD_SORT` (Engagement/Most Recent/Impressions),
//! `LEADERBOARD_SHOW_ALL` (1 = 50 rows).

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use gtm_dashboard::sources::HttpSource;
use gtm_dashboard::{telemetry, Dashboard, DashboardConfig, Poller, ViewState};

fn view_from_env() -> anyhow::Result<ViewState> {
    let mut st = ViewState::default();
    if let Ok(f) = std::env::var("LEADERBOARD_FILTER") {
        st.filter = f.parse().context("LEADERBOARD_FILTER")?;
    }
    if let Ok(s) = std::env::var("LEADERBOARD_SORT") {
        st.sort = s.parse().context("LEADERBOARD_SORT")?;
    }
    st.show_all = std::env::var("LEADERBOARD_SHOW_ALL").is_ok_and(|v| v == "1");
    Ok(st)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cfg = DashboardConfig::load_default()?;
    let view = view_from_env()?;
    let source = Arc::new(HttpSource::new(&cfg.metrics_endpoint, &cfg.feed_endpoint)?);
    let dashboard = Arc::new(Dashboard::new(cfg.timestamp_policy()));

    tracing::info!(
        target: "leaderboard",
        metrics = %cfg.metrics_endpoint,
        feed = %cfg.feed_endpoint,
        every_secs = cfg.poll_interval_secs,
        "polling"
    );

    let poller = Poller::new(dashboard.clone(), source.clone(), source);
    poller.poll_once().await;
    let _bg = poller.spawn(cfg.poll_interval());

    let mut ticker = tokio::time::interval(cfg.poll_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let v = dashboard.view(&view, Utc::now());
                println!("{}", v.render_text());
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(target: "leaderboard", "bye");
                return Ok(());
            }
        }
    }
}
