use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tower_http::cors::CorsLayer;

use crate::dashboard::{Dashboard, DashboardView};
use crate::error::ApiError;
use crate::model::{FeedResponse, MetricsResponse};
use crate::pipeline::ViewState;
use crate::sources::{FeedSource, MetricsSource};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub metrics_source: Arc<dyn MetricsSource>,
    pub feed_source: Arc<dyn FeedSource>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/metrics", get(get_metrics))
        .route("/feed", get(get_feed))
        .route("/view", get(get_view))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn get_metrics(State(state): State<AppState>) -> Result<Json<MetricsResponse>, ApiError> {
    let metrics = state
        .metrics_source
        .fetch_metrics()
        .await
        .map_err(|e| ApiError::Upstream(format!("{e:#}")))?;
    Ok(Json(MetricsResponse { metrics }))
}

async fn get_feed(State(state): State<AppState>) -> Result<Json<FeedResponse>, ApiError> {
    let items = state
        .feed_source
        .fetch_feed()
        .await
        .map_err(|e| ApiError::Upstream(format!("{e:#}")))?;
    Ok(Json(FeedResponse { items }))
}

#[derive(Debug, Default, serde::Deserialize)]
struct ViewQuery {
    #[serde(default)]
    filter: Option<String>,
    #[serde(default)]
    sort: Option<String>,
    #[serde(default, rename = "showAll")]
    show_all: Option<String>,
}

impl ViewQuery {
    fn into_state(self) -> Result<ViewState, ApiError> {
        let mut st = ViewState::default();
        if let Some(f) = self.filter.as_deref().filter(|s| !s.is_empty()) {
            st.filter = f.parse()?;
        }
        if let Some(s) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            st.sort = s.parse()?;
        }
        if let Some(v) = self.show_all.as_deref() {
            st.show_all = match v.trim().to_ascii_lowercase().as_str() {
                "" | "0" | "false" | "no" => false,
                "1" | "true" | "yes" => true,
                other => {
                    return Err(ApiError::BadRequest(format!(
                        "showAll must be a boolean, got '{other}'"
                    )))
                }
            };
        }
        Ok(st)
    }
}

/// Leaderboard + KPIs from the latest snapshots.
async fn get_view(
    State(state): State<AppState>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let view = q.into_state()?;
    Ok(Json(state.dashboard.view(&view, Utc::now())))
}
