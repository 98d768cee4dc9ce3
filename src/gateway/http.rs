use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::DataGateway;
use crate::error::{AppError, AppResult};
use crate::models::{Movement, MovementKind, NewMovement, NewProduct, Product};

/// Gateway over the JSON-over-HTTP data API (`/productos`, `/entradas`,
/// `/salidas`).
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%method, %url, "Data API request");
        self.client.request(method, url)
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("{} not found", url)));
        }
        Err(AppError::Network(format!(
            "{} returned {}{}",
            url,
            status,
            if body.is_empty() { String::new() } else { format!(": {}", body) }
        )))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Network(format!("undecodable response: {}", e)))
    }
}

#[async_trait]
impl DataGateway for HttpGateway {
    fn backend(&self) -> &'static str {
        "http"
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.fetch(self.request(Method::GET, "productos")).await
    }

    async fn create_product(&self, product: &NewProduct) -> AppResult<Product> {
        self.fetch(self.request(Method::POST, "productos").json(product)).await
    }

    async fn update_product(&self, product: &Product) -> AppResult<Product> {
        let path = format!("productos/{}", product.id);
        self.fetch(self.request(Method::PUT, &path).json(product)).await
    }

    async fn delete_product(&self, id: i64) -> AppResult<()> {
        let path = format!("productos/{}", id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn list_movements(&self, kind: MovementKind) -> AppResult<Vec<Movement>> {
        self.fetch(self.request(Method::GET, kind.as_ref())).await
    }

    async fn create_movement(&self, kind: MovementKind, movement: &NewMovement) -> AppResult<Movement> {
        self.fetch(self.request(Method::POST, kind.as_ref()).json(movement))
            .await
    }
}
