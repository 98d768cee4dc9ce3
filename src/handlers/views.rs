use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    render,
    views::{self, DashboardView, ExpiryView, View, ViewSnapshot},
    AppState,
};

fn parse_view(name: &str) -> AppResult<View> {
    View::from_str(name).map_err(|_| AppError::NotFound(format!("Unknown view `{}`", name)))
}

/// Select `view` in the shell, load it, and hand the result back to the
/// shell. The flag tells whether the shell kept it (`false` when another
/// navigation happened while loading).
async fn navigate_and_load(state: &AppState, view: View) -> AppResult<(ViewSnapshot, bool)> {
    let ticket = state.shell.write().await.navigate(view);
    let snapshot = views::load(view, &state.view_context()).await?;
    let current = state.shell.write().await.complete(ticket, snapshot.clone());
    Ok((snapshot, current))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub view: Option<String>,
}

// ── GET / ────────────────────────────────────────────────────────────────────

pub async fn shell_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> (StatusCode, Html<String>) {
    let view = match query.view.as_deref() {
        Some(name) => match parse_view(name) {
            Ok(view) => view,
            Err(err) => {
                let selected = state.shell.read().await.selected();
                return (err.status(), Html(render::page(selected, Err(&err.to_string()))));
            }
        },
        None => state.shell.read().await.selected(),
    };

    match navigate_and_load(&state, view).await {
        Ok((snapshot, _)) => (StatusCode::OK, Html(render::page(view, Ok(&snapshot)))),
        Err(err) => (err.status(), Html(render::page(view, Err(&err.to_string())))),
    }
}

// ── GET /api/shell ───────────────────────────────────────────────────────────

pub async fn shell_state(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let shell = state.shell.read().await.state();
    (StatusCode::OK, Json(json!({ "data": shell })))
}

// ── GET /api/views/:view ─────────────────────────────────────────────────────

pub async fn show_view(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let view = parse_view(&name)?;
    let (snapshot, current) = navigate_and_load(&state, view).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "title": view.title(),
            "current": current,
            "data": snapshot,
        })),
    ))
}

// ── GET /api/dashboard ───────────────────────────────────────────────────────

pub async fn dashboard(State(state): State<AppState>) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let view = DashboardView::load(&state.view_context()).await?;
    Ok((StatusCode::OK, Json(json!({ "data": view }))))
}

// ── GET /api/caducidad ───────────────────────────────────────────────────────

pub async fn caducidad(State(state): State<AppState>) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let view = ExpiryView::load(&state.view_context()).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "data": view,
            "count": view.products.len(),
        })),
    ))
}
