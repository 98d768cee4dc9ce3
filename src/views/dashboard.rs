use serde::Serialize;
use tracing::debug;

use super::{movement_rows, MovementRow, ProductRow, ViewContext};
use crate::aggregate;
use crate::error::AppResult;
use crate::models::{MovementKind, Product};

/// Landing screen: stock totals, latest movements, expiry warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub total_stock: u64,
    pub near_expiry_count: usize,
    pub expired_count: usize,
    pub entradas_count: usize,
    pub salidas_count: usize,
    pub recent_entradas: Vec<MovementRow>,
    pub recent_salidas: Vec<MovementRow>,
    pub near_expiry: Vec<ProductRow>,
    pub expired: Vec<ProductRow>,
}

impl DashboardView {
    pub async fn load(ctx: &ViewContext) -> AppResult<Self> {
        let gateway = ctx.gateway.as_ref();
        let (products, entradas, salidas) = tokio::try_join!(
            gateway.list_products(),
            gateway.list_movements(MovementKind::Inbound),
            gateway.list_movements(MovementKind::Outbound),
        )?;
        debug!(
            products = products.len(),
            entradas = entradas.len(),
            salidas = salidas.len(),
            "Dashboard data loaded"
        );

        let days = ctx.default_shelf_life_days;
        let near = aggregate::near_expiry(&products, ctx.today, days)?;
        let expired = aggregate::expired(&products, ctx.today, days)?;
        let rows = |list: Vec<Product>| -> AppResult<Vec<ProductRow>> {
            list.into_iter()
                .map(|p| ProductRow::new(p, ctx).map_err(Into::into))
                .collect()
        };

        Ok(Self {
            total_stock: aggregate::total_stock(&products),
            near_expiry_count: near.len(),
            expired_count: expired.len(),
            entradas_count: entradas.len(),
            salidas_count: salidas.len(),
            recent_entradas: movement_rows(aggregate::recent(&entradas, ctx.recent_limit), &products),
            recent_salidas: movement_rows(aggregate::recent(&salidas, ctx.recent_limit), &products),
            near_expiry: rows(near)?,
            expired: rows(expired)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::super::test_support::*;
    use super::*;
    use crate::error::AppError;
    use crate::expiry::ExpiryStatus;
    use crate::gateway::{DataGateway, InMemoryGateway};
    use crate::models::NewMovement;

    async fn seeded() -> Arc<InMemoryGateway> {
        let gw = Arc::new(InMemoryGateway::with_products([
            product(1, "Fresa", 10, Some(3)),
            product(2, "Cereza", 5, Some(-1)),
            product(3, "Piña", 7, None),
        ]));
        for i in 0..7u32 {
            gw.create_movement(
                MovementKind::Inbound,
                &NewMovement { product_id: 1, quantity: i + 1, timestamp: Utc::now() },
            )
            .await
            .unwrap();
        }
        gw.create_movement(
            MovementKind::Outbound,
            &NewMovement { product_id: 99, quantity: 2, timestamp: Utc::now() },
        )
        .await
        .unwrap();
        gw
    }

    #[tokio::test]
    async fn summarises_stock_movements_and_expiry() {
        let view = DashboardView::load(&context(seeded().await)).await.unwrap();

        assert_eq!(view.total_stock, 22);
        assert_eq!(view.entradas_count, 7);
        assert_eq!(view.salidas_count, 1);

        let quantities: Vec<u32> = view.recent_entradas.iter().map(|r| r.movement.quantity).collect();
        assert_eq!(quantities, vec![7, 6, 5, 4, 3]);
        assert_eq!(view.recent_entradas[0].product, "Fresa");
        assert_eq!(view.recent_salidas[0].product, "99");

        assert_eq!(view.near_expiry_count, 1);
        assert_eq!(view.near_expiry[0].product.id, 1);
        assert_eq!(view.near_expiry[0].status, ExpiryStatus::Near);
        assert_eq!(view.expired_count, 1);
        assert_eq!(view.expired[0].product.id, 2);
        assert_eq!(view.expired[0].badge.color, "red");
    }

    #[tokio::test]
    async fn any_failed_fetch_fails_the_load() {
        let gw = seeded().await;
        gw.set_offline(true);
        let err = DashboardView::load(&context(gw)).await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
    }

    #[tokio::test]
    async fn malformed_expiration_surfaces_as_invalid_date() {
        let mut broken = product(4, "Higo", 1, None);
        broken.expiration_date = Some("31-12-2026".into());
        let gw = Arc::new(InMemoryGateway::with_products([broken]));
        let err = DashboardView::load(&context(gw)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidDate(_)));
    }
}
