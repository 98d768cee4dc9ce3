use chrono::Utc;
use serde::Serialize;
use validator::Validate;

use super::{movement_rows, MovementRow, ViewContext};
use crate::error::AppResult;
use crate::gateway::RecordedMovement;
use crate::models::{Movement, MovementForm, MovementKind, Product};
use crate::stock::MovementSubmission;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductOption {
    pub id: i64,
    pub name: String,
    pub stock: u32,
}

/// Entradas or Salidas table plus the product picker of its form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementsView {
    pub kind: MovementKind,
    pub movements: Vec<MovementRow>,
    pub products: Vec<ProductOption>,
}

/// The Entradas / Salidas screen. Both kinds behave the same apart from the
/// stock direction and the outbound guard.
pub struct MovementScreen<'a> {
    ctx: &'a ViewContext,
    kind: MovementKind,
    products: Vec<Product>,
    movements: Vec<Movement>,
}

impl<'a> MovementScreen<'a> {
    pub async fn mount(ctx: &'a ViewContext, kind: MovementKind) -> AppResult<MovementScreen<'a>> {
        let mut screen = Self {
            ctx,
            kind,
            products: Vec::new(),
            movements: Vec::new(),
        };
        screen.reload().await?;
        Ok(screen)
    }

    async fn reload(&mut self) -> AppResult<()> {
        let gateway = self.ctx.gateway.as_ref();
        let (products, movements) =
            tokio::try_join!(gateway.list_products(), gateway.list_movements(self.kind))?;
        self.products = products;
        self.movements = movements;
        Ok(())
    }

    pub fn render(&self) -> MovementsView {
        MovementsView {
            kind: self.kind,
            movements: movement_rows(self.movements.clone(), &self.products),
            products: self
                .products
                .iter()
                .map(|p| ProductOption {
                    id: p.id,
                    name: p.name.clone(),
                    stock: p.stock,
                })
                .collect(),
        }
    }

    /// Validate the form, apply the stock policy and reload on success.
    pub async fn submit(&mut self, form: MovementForm) -> AppResult<RecordedMovement> {
        form.validate()?;
        let submission = MovementSubmission {
            kind: self.kind,
            product_id: form.product_id.unwrap_or_default(),
            quantity: form.quantity.unwrap_or_default(),
        };

        let recorded = submission
            .commit(self.ctx.gateway.as_ref(), &self.products, Utc::now())
            .await?;
        self.reload().await?;
        Ok(recorded)
    }
}
