//! Access to the product / movement collections of the data API.

mod http;
mod memory;

pub use http::HttpGateway;
pub use memory::InMemoryGateway;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Movement, MovementKind, NewMovement, NewProduct, Product};

/// A committed movement together with the product as it was written back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedMovement {
    pub product: Product,
    pub movement: Movement,
}

#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Short name used in logs and metrics.
    fn backend(&self) -> &'static str;

    async fn list_products(&self) -> AppResult<Vec<Product>>;

    async fn create_product(&self, product: &NewProduct) -> AppResult<Product>;

    /// Full replacement (`PUT`) of an existing product.
    async fn update_product(&self, product: &Product) -> AppResult<Product>;

    async fn delete_product(&self, id: i64) -> AppResult<()>;

    async fn list_movements(&self, kind: MovementKind) -> AppResult<Vec<Movement>>;

    async fn create_movement(&self, kind: MovementKind, movement: &NewMovement) -> AppResult<Movement>;

    /// Apply a movement to `product` and record it.
    ///
    /// The default issues two sequential requests: the stock update, then the
    /// movement record. If the second fails the stock change stays in place.
    /// Backends able to do both in one step override this.
    async fn record_movement(
        &self,
        kind: MovementKind,
        product: &Product,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> AppResult<RecordedMovement> {
        let new_stock = kind
            .apply(product.stock, quantity)
            .ok_or(AppError::InsufficientStock {
                product_id: product.id,
                requested: quantity,
                available: product.stock,
            })?;

        let updated = self.update_product(&product.with_stock(new_stock)).await?;
        debug!(product_id = product.id, stock = updated.stock, %kind, "Stock written, recording movement");

        let movement = self
            .create_movement(
                kind,
                &NewMovement {
                    product_id: product.id,
                    quantity,
                    timestamp: at,
                },
            )
            .await?;

        Ok(RecordedMovement {
            product: updated,
            movement,
        })
    }
}
