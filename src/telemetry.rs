//! Tracing setup and the Prometheus recorder.

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins; `LOG_FORMAT=json` switches
/// to JSON lines. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gtm_dashboard=info,leaderboard=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// One-time metrics registration (so series show up on /debug/metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "dashboard_fetch_total",
            "Source fetches by source and outcome (stored, stale, failed)."
        );
        describe_counter!(
            "dashboard_stale_responses_total",
            "Completions dropped because a newer tick already landed."
        );
        describe_gauge!("dashboard_feed_items", "Items in the latest feed snapshot.");
        describe_gauge!("dashboard_last_poll_ts", "Unix ts of the last poll tick.");
        describe_histogram!("dashboard_fetch_ms", "Source fetch time in milliseconds.");
    });
}

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install (once per process) the Prometheus recorder.
    pub fn init() -> anyhow::Result<Self> {
        static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();
        let handle = HANDLE
            .get_or_try_init(|| PrometheusBuilder::new().install_recorder())?
            .clone();
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Router exposing `/debug/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/debug/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// `DEBUG_ROUTES=1` enables the diagnostics routes.
pub fn debug_routes_enabled() -> bool {
    std::env::var("DEBUG_ROUTES").is_ok_and(|v| v == "1")
}
