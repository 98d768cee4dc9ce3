//! Stock mutation policy for movement submissions.
//!
//! A submission starts [`Pending`](MovementSubmission); checking it against
//! the product either rejects it (no writes at all) or yields a
//! [`StockChange`] which the gateway then commits.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::gateway::{DataGateway, RecordedMovement};
use crate::models::{MovementKind, Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementSubmission {
    pub kind: MovementKind,
    pub product_id: i64,
    pub quantity: u32,
}

/// An accepted submission: the stock transition it will write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockChange {
    pub kind: MovementKind,
    pub product_id: i64,
    pub quantity: u32,
    pub stock_before: u32,
    pub stock_after: u32,
}

impl MovementSubmission {
    /// Pure guard. Outbound quantities above the current stock are rejected;
    /// draining stock to exactly zero is allowed.
    pub fn check(&self, product: &Product) -> AppResult<StockChange> {
        let stock_after = self
            .kind
            .apply(product.stock, self.quantity)
            .ok_or(AppError::InsufficientStock {
                product_id: product.id,
                requested: self.quantity,
                available: product.stock,
            })?;

        Ok(StockChange {
            kind: self.kind,
            product_id: product.id,
            quantity: self.quantity,
            stock_before: product.stock,
            stock_after,
        })
    }

    /// Check against the view's copy of `products`, then commit through the
    /// gateway. A rejected submission never reaches the gateway.
    pub async fn commit(
        self,
        gateway: &dyn DataGateway,
        products: &[Product],
        at: DateTime<Utc>,
    ) -> AppResult<RecordedMovement> {
        let product = products
            .iter()
            .find(|p| p.id == self.product_id)
            .ok_or_else(|| {
                AppError::Validation(format!("product {} does not exist", self.product_id))
            })?;

        let change = self.check(product)?;
        let recorded = gateway
            .record_movement(self.kind, product, self.quantity, at)
            .await?;

        info!(
            kind = %change.kind,
            product_id = change.product_id,
            quantity = change.quantity,
            stock_before = change.stock_before,
            stock_after = recorded.product.stock,
            "Movement committed"
        );
        Ok(recorded)
    }
}
