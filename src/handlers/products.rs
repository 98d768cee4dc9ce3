use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::{error::AppResult, models::ProductForm, views::ProductsScreen, AppState};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(State(state): State<AppState>) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let ctx = state.view_context();
    let view = ProductsScreen::mount(&ctx).await?.render();

    Ok((
        StatusCode::OK,
        Json(json!({
            "count": view.count,
            "data": view,
        })),
    ))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let ctx = state.view_context();
    let mut screen = ProductsScreen::mount(&ctx).await?;
    let product = screen.create(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Producto agregado",
            "data": product,
            "view": screen.render(),
        })),
    ))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<ProductForm>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let ctx = state.view_context();
    let mut screen = ProductsScreen::mount(&ctx).await?;
    let product = screen.update(id, form).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Producto actualizado",
            "data": product,
            "view": screen.render(),
        })),
    ))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let ctx = state.view_context();
    let mut screen = ProductsScreen::mount(&ctx).await?;
    screen.delete(id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Producto eliminado",
            "id": id,
            "view": screen.render(),
        })),
    ))
}
