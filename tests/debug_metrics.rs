// tests/debug_metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use gtm_dashboard::{build, DashboardConfig};

#[tokio::test]
#[serial_test::serial]
async fn debug_metrics_exposes_fetch_series_when_enabled() {
    std::env::set_var("DEBUG_ROUTES", "1");
    let (app, poller) = build(&DashboardConfig::default()).expect("build app");
    poller.poll_once().await;

    let resp = app
        .oneshot(Request::get("/debug/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "dashboard_fetch_total",
        "dashboard_fetch_ms",
        "dashboard_feed_items",
        "dashboard_last_poll_ts",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
    std::env::remove_var("DEBUG_ROUTES");
}

#[tokio::test]
#[serial_test::serial]
async fn debug_metrics_is_hidden_by_default() {
    std::env::remove_var("DEBUG_ROUTES");
    let (app, _) = build(&DashboardConfig::default()).expect("build app");
    let resp = app
        .oneshot(Request::get("/debug/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
