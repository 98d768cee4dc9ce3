use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;

use crate::{
    error::AppResult,
    models::{MovementForm, MovementKind},
    views::MovementScreen,
    AppState,
};

async fn list(state: AppState, kind: MovementKind) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let ctx = state.view_context();
    let view = MovementScreen::mount(&ctx, kind).await?.render();

    Ok((
        StatusCode::OK,
        Json(json!({
            "count": view.movements.len(),
            "data": view,
        })),
    ))
}

async fn submit(
    state: AppState,
    kind: MovementKind,
    form: MovementForm,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let ctx = state.view_context();
    let mut screen = MovementScreen::mount(&ctx, kind).await?;
    let recorded = screen.submit(form).await?;

    let message = match kind {
        MovementKind::Inbound => "Entrada registrada",
        MovementKind::Outbound => "Salida registrada",
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": message,
            "data": recorded,
            "view": screen.render(),
        })),
    ))
}

// ── /api/entradas ─────────────────────────────────────────────────────────────

pub async fn list_entradas(State(state): State<AppState>) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    list(state, MovementKind::Inbound).await
}

pub async fn create_entrada(
    State(state): State<AppState>,
    Json(form): Json<MovementForm>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    submit(state, MovementKind::Inbound, form).await
}

// ── /api/salidas ──────────────────────────────────────────────────────────────

pub async fn list_salidas(State(state): State<AppState>) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    list(state, MovementKind::Outbound).await
}

pub async fn create_salida(
    State(state): State<AppState>,
    Json(form): Json<MovementForm>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    submit(state, MovementKind::Outbound, form).await
}
