//! JSON API over a [`Dashboard`], plus a single page that draws it.

use std::sync::Arc;

use axum::debug_handler;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domains::WindowSelector;
use crate::{Dashboard, DashboardError, DashboardView, view};

pub struct AppState {
    pub dashboard: Dashboard,
    pub metrics: Option<PrometheusHandle>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
struct RangesDto {
    ranges: [&'static str; 5],
    default: &'static str,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

const INDEX_HTML: &str = include_str!("../assets/index.html");

#[debug_handler]
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[debug_handler]
async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default();
    ([("content-type", "text/plain; version=0.0.4")], body)
}

#[debug_handler]
async fn ranges() -> Json<RangesDto> {
    Json(RangesDto {
        ranges: WindowSelector::NAMES,
        default: WindowSelector::NAMES[0],
    })
}

#[debug_handler]
async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let selector = WindowSelector::from_parts(
        q.range.as_deref().unwrap_or(WindowSelector::NAMES[0]),
        q.start.as_deref(),
        q.end.as_deref(),
    )
    .map_err(map_err)?;
    let dataset = state.dashboard.load().await.map_err(map_err)?;
    Ok(Json(view(&dataset, &selector)))
}

fn map_err(e: DashboardError) -> ApiError {
    let status = match e {
        DashboardError::InvalidWindow(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": e.user_message() })))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/ranges", get(ranges))
        .route("/api/dashboard", get(dashboard))
        .with_state(state)
}
