pub mod metrics;
pub mod movements;
pub mod products;
pub mod views;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{error::AppResult, expiry, seed, AppState};

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "service": "fruteria-dashboard" })))
}

#[derive(Debug, Deserialize)]
pub struct SeedParams {
    /// Number of demo products to create (default: 20, max: 1000)
    pub count: Option<usize>,
}

// ── POST /api/seed ───────────────────────────────────────────────────────────

pub async fn seed_data(
    State(state): State<AppState>,
    Query(params): Query<SeedParams>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let count = params.count.unwrap_or(20).min(1_000);
    let products = seed::seed_products(state.gateway.as_ref(), count, expiry::today()).await?;
    info!(count = products.len(), "Seeded demo catalog");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} productos creados", products.len()),
            "count": products.len(),
            "data": products,
        })),
    ))
}
