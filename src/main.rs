use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod aggregate;
mod config;
mod error;
mod expiry;
mod gateway;
mod handlers;
mod metrics;
mod models;
mod render;
mod seed;
mod shell;
mod stock;
mod views;

use crate::config::{Config, DataBackend};
use crate::gateway::{DataGateway, HttpGateway, InMemoryGateway};
use crate::metrics::{InstrumentedGateway, MetricsStore};
use crate::shell::Shell;
use crate::views::ViewContext;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn DataGateway>,
    pub shell: Arc<RwLock<Shell>>,
    pub metrics: Arc<RwLock<MetricsStore>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wrap `gateway` so every call lands in the metrics store.
    pub fn new(config: Config, gateway: Arc<dyn DataGateway>) -> Self {
        let metrics = Arc::new(RwLock::new(MetricsStore::with_capacity(config.metrics_capacity)));
        Self {
            gateway: Arc::new(InstrumentedGateway::new(gateway, metrics.clone())),
            shell: Arc::new(RwLock::new(Shell::new())),
            metrics,
            config: Arc::new(config),
        }
    }

    /// Context for a screen mounted now.
    pub fn view_context(&self) -> ViewContext {
        ViewContext {
            gateway: self.gateway.clone(),
            today: expiry::today(),
            default_shelf_life_days: self.config.default_shelf_life_days,
            recent_limit: self.config.recent_limit,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fruteria_dashboard=debug".into()),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  FRUTEX · inventario de frutería     ║");
    info!("╚══════════════════════════════════════╝");

    let gateway: Arc<dyn DataGateway> = match config.backend {
        DataBackend::Http => {
            let http = HttpGateway::new(
                config.api_base_url.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?;
            info!(base_url = %http.base_url(), "Using data API");
            Arc::new(http)
        }
        DataBackend::Memory => {
            info!("Using in-memory data store");
            let memory = InMemoryGateway::new();
            if config.seed_count > 0 {
                seed::seed_products(&memory, config.seed_count, expiry::today()).await?;
            }
            Arc::new(memory)
        }
    };

    let addr = format!("{}:{}", config.host, config.port);
    let app = build_router(AppState::new(config, gateway));

    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Shell ───────────────────────────────────────────────────────────
        .route("/", get(handlers::views::shell_page))
        .route("/api/shell", get(handlers::views::shell_state))
        .route("/api/views/:view", get(handlers::views::show_view))

        // ── Screens ─────────────────────────────────────────────────────────
        .route("/api/dashboard", get(handlers::views::dashboard))
        .route("/api/caducidad", get(handlers::views::caducidad))
        .route(
            "/api/productos",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/productos/:id",
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        .route(
            "/api/entradas",
            get(handlers::movements::list_entradas).post(handlers::movements::create_entrada),
        )
        .route(
            "/api/salidas",
            get(handlers::movements::list_salidas).post(handlers::movements::create_salida),
        )

        // ── Seed ────────────────────────────────────────────────────────────
        .route("/api/seed", post(handlers::seed_data))

        // ── Metrics ─────────────────────────────────────────────────────────
        .route(
            "/api/metrics",
            get(handlers::metrics::metrics_report).delete(handlers::metrics::reset_metrics),
        )
        .route("/api/metrics/export/csv", get(handlers::metrics::export_csv))

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use chrono::Duration as Days;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::models::Product;

    fn product(id: i64, name: &str, stock: u32, offset_days: i64) -> Product {
        Product {
            expiration_date: Some(
                (expiry::today() + Days::days(offset_days))
                    .format("%Y-%m-%d")
                    .to_string(),
            ),
            ..Product::new(id, name, 1.0, stock)
        }
    }

    fn app_with(products: Vec<Product>) -> (Router, Arc<InMemoryGateway>) {
        app_with_config(Config::default(), products)
    }

    fn app_with_config(config: Config, products: Vec<Product>) -> (Router, Arc<InMemoryGateway>) {
        let memory = Arc::new(InMemoryGateway::with_products(products));
        let state = AppState::new(config, memory.clone());
        (build_router(state), memory)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_ok() {
        let (app, _) = app_with(vec![]);
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn dashboard_reports_near_and_expired() {
        let (app, _) = app_with(vec![
            product(1, "Fresa", 10, 3),
            product(2, "Cereza", 5, -1),
        ]);
        let (status, body) = call(&app, Method::GET, "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["total_stock"], 15);
        assert_eq!(data["near_expiry"][0]["id"], 1);
        assert_eq!(data["near_expiry"][0]["status"], "near");
        assert_eq!(data["expired"][0]["nombre"], "Cereza");
        assert_eq!(data["expired"][0]["badge"]["color"], "red");
    }

    #[tokio::test]
    async fn outbound_rejected_then_drained() {
        let (app, memory) = app_with(vec![product(2, "Cereza", 5, -1)]);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/salidas",
            Some(json!({ "productoId": 2, "cantidad": 6 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["kind"], "insufficient_stock");
        assert_eq!(memory.list_products().await.unwrap()[0].stock, 5);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/salidas",
            Some(json!({ "productId": 2, "quantity": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Salida registrada");
        assert_eq!(body["data"]["product"]["stock"], 0);
        assert_eq!(body["view"]["movements"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn inbound_adds_stock() {
        let (app, memory) = app_with(vec![product(1, "Fresa", 10, 3)]);
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/entradas",
            Some(json!({ "productoId": 1, "cantidad": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(memory.list_products().await.unwrap()[0].stock, 14);

        let (_, body) = call(&app, Method::GET, "/api/entradas", None).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"]["movements"][0]["product"], "Fresa");
        assert_eq!(body["data"]["movements"][0]["cantidad"], 4);
    }

    #[tokio::test]
    async fn product_crud_through_screen_endpoints() {
        let (app, _) = app_with(vec![]);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/productos",
            Some(json!({ "nombre": "Mango", "precio": 2.5, "stock": 12 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_i64().unwrap();
        assert!(body["data"]["fechaCaducidad"].is_string(), "default date filled in");

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("/api/productos/{}", id),
            Some(json!({ "nombre": "Mango Kent", "precio": 3.0, "stock": 7, "fechaCaducidad": "2030-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["products"][0]["nombre"], "Mango Kent");

        let (status, body) = call(&app, Method::DELETE, &format!("/api/productos/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["count"], 0);
    }

    #[tokio::test]
    async fn missing_form_fields_are_422() {
        let (app, _) = app_with(vec![]);
        let (status, body) = call(&app, Method::POST, "/api/productos", Some(json!({ "precio": 1.0 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["kind"], "validation");
    }

    #[tokio::test]
    async fn network_failure_becomes_notification() {
        let (app, memory) = app_with(vec![product(1, "Fresa", 10, 3)]);
        memory.set_offline(true);
        let (status, body) = call(&app, Method::GET, "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["kind"], "network");

        // The service stays usable once the data API is back.
        memory.set_offline(false);
        let (status, _) = call(&app, Method::GET, "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn navigation_updates_shell() {
        let (app, _) = app_with(vec![product(1, "Fresa", 10, 3)]);

        let (status, body) = call(&app, Method::GET, "/api/views/caducidad", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current"], true);
        assert_eq!(body["title"], "Caducidad");
        assert_eq!(body["data"]["view"], "caducidad");

        let (_, body) = call(&app, Method::GET, "/api/shell", None).await;
        assert_eq!(body["data"]["selected"], "caducidad");
        assert_eq!(body["data"]["snapshot"]["view"], "caducidad");
        assert_eq!(body["data"]["menu"].as_array().unwrap().len(), 5);

        let (status, _) = call(&app, Method::GET, "/api/views/inventario", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn html_shell_renders_selected_view() {
        let (app, _) = app_with(vec![product(1, "Fresa", 10, 3)]);
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/?view=caducidad").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Caducidad</h1>"));
        assert!(html.contains("Por caducar"));
    }

    #[tokio::test]
    async fn gateway_calls_show_up_in_metrics() {
        let (app, _) = app_with(vec![]);
        call(&app, Method::GET, "/api/productos", None).await;

        let (_, body) = call(&app, Method::GET, "/api/metrics", None).await;
        assert_eq!(body["entry_count"], 1);
        assert_eq!(body["operations"][0]["operation"], "list_products");
        assert_eq!(body["operations"][0]["backend"], "memory");
        assert_eq!(body["operations"][0]["failure_rate"], 0.0);

        let (_, body) = call(&app, Method::DELETE, "/api/metrics", None).await;
        assert_eq!(body["cleared"], 1);
    }

    #[tokio::test]
    async fn metrics_stay_bounded_under_repeated_loads() {
        let config = Config {
            metrics_capacity: 4,
            ..Config::default()
        };
        let (app, _) = app_with_config(config, vec![product(1, "Pera", 3, 20)]);
        for _ in 0..50 {
            let (status, _) = call(&app, Method::GET, "/api/dashboard", None).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = call(&app, Method::GET, "/api/metrics", None).await;
        assert_eq!(body["entry_count"], 4);
        assert_eq!(body["capacity"], 4);
    }

    #[tokio::test]
    async fn oversized_shelf_life_is_an_error_not_a_crash() {
        let config = Config {
            default_shelf_life_days: 200_000_000,
            ..Config::default()
        };
        let undated = Product::new(1, "Granada", 1.0, 4);
        let (app, _) = app_with_config(config, vec![undated]);

        let (status, body) = call(&app, Method::GET, "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["kind"], "invalid_date");
    }

    #[tokio::test]
    async fn seed_creates_products() {
        let (app, memory) = app_with(vec![]);
        let (status, body) = call(&app, Method::POST, "/api/seed?count=8", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["count"], 8);
        assert_eq!(memory.list_products().await.unwrap().len(), 8);
    }
}
