use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{error::AppResult, AppState};

// ── GET /api/metrics ─────────────────────────────────────────────────────────

pub async fn metrics_report(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let metrics = state.metrics.read().await;

    (
        StatusCode::OK,
        Json(json!({
            "entry_count": metrics.entry_count(),
            "capacity": metrics.capacity(),
            "operations": metrics.aggregated(),
        })),
    )
}

// ── GET /api/metrics/export/csv ──────────────────────────────────────────────

pub async fn export_csv(State(state): State<AppState>) -> AppResult<Response> {
    let csv = state.metrics.read().await.to_csv()?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"gateway_metrics.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

// ── DELETE /api/metrics ──────────────────────────────────────────────────────

pub async fn reset_metrics(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let mut metrics = state.metrics.write().await;
    let cleared = metrics.entry_count();
    metrics.clear();

    (
        StatusCode::OK,
        Json(json!({
            "message": "Metrics cleared",
            "cleared": cleared,
        })),
    )
}
