//! GTM dashboard — server entrypoint.
//! Serves `/metrics`, `/feed` and `/view`, and keeps the in-process
//! snapshots fresh with the periodic poller.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    gtm_dashboard::telemetry::init_tracing();

    let router = gtm_dashboard::app().await?;
    tracing::info!("gtm dashboard ready");

    Ok(router.into())
}
