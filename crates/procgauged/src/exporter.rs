//! HTTP surface: Prometheus scrape endpoint, JSON snapshot, health check.
//!
//! Handlers only read the gauge registry.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::error;

use procgauge_core::{GaugeRegistry, MetricsConfig, MetricsSnapshot};

#[derive(Clone)]
pub(crate) struct ExporterState {
    pub(crate) gauges: Arc<GaugeRegistry>,
    pub(crate) config: MetricsConfig,
}

pub(crate) fn router(state: ExporterState) -> Router {
    Router::new()
        .route("/metrics", get(handle_metrics))
        .route("/api/v1/snapshot", get(handle_snapshot))
        .route("/health", get(handle_health))
        .with_state(state)
}

async fn handle_metrics(State(state): State<ExporterState>) -> Response {
    match state.gauges.encode_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, state.gauges.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn handle_snapshot(State(state): State<ExporterState>) -> Json<MetricsSnapshot> {
    Json(MetricsSnapshot::capture(&state.gauges, &state.config))
}

async fn handle_health() -> &'static str {
    "ok"
}
