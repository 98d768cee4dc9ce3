//! The five dashboard screens. Each one loads its own data through the
//! gateway when mounted and reloads after every mutation it performs; no
//! data is shared between screens.

mod dashboard;
mod expiry;
mod movements;
mod products;

pub use dashboard::DashboardView;
pub use expiry::ExpiryView;
pub use movements::{MovementScreen, MovementsView, ProductOption};
pub use products::{ProductsScreen, ProductsView};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::AppResult;
use crate::expiry::{classify, Badge, ExpiryStatus, InvalidDateError};
use crate::gateway::DataGateway;
use crate::models::{Movement, MovementKind, Product};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum View {
    #[default]
    Dashboard,
    Productos,
    Entradas,
    Salidas,
    Caducidad,
}

impl View {
    /// Header text: the menu key with its first letter capitalized.
    pub fn title(self) -> String {
        let key = self.to_string();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => key,
        }
    }

    pub fn menu() -> Vec<View> {
        View::iter().collect()
    }
}

/// What a screen needs to load and render.
#[derive(Clone)]
pub struct ViewContext {
    pub gateway: Arc<dyn DataGateway>,
    pub today: NaiveDate,
    pub default_shelf_life_days: i64,
    pub recent_limit: usize,
}

/// Table row for a product with its expiration badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    #[serde(flatten)]
    pub product: Product,
    /// Date actually classified; the default when the product has none.
    pub effective_expiration: NaiveDate,
    pub status: ExpiryStatus,
    pub badge: Badge,
}

impl ProductRow {
    pub fn new(product: Product, ctx: &ViewContext) -> Result<Self, InvalidDateError> {
        let effective_expiration =
            product.expiration_or_default(ctx.today, ctx.default_shelf_life_days)?;
        let status = classify(effective_expiration, ctx.today);
        Ok(Self {
            product,
            effective_expiration,
            status,
            badge: status.badge(),
        })
    }
}

/// Table row for a movement. `product` is the product's name, or its raw id
/// when the product no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementRow {
    #[serde(flatten)]
    pub movement: Movement,
    pub product: String,
}

pub(crate) fn movement_rows(movements: Vec<Movement>, products: &[Product]) -> Vec<MovementRow> {
    let names: HashMap<i64, &str> = products.iter().map(|p| (p.id, p.name.as_str())).collect();
    movements
        .into_iter()
        .map(|movement| {
            let product = names
                .get(&movement.product_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| movement.product_id.to_string());
            MovementRow { movement, product }
        })
        .collect()
}

/// A rendered screen, as held by the shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "lowercase")]
pub enum ViewSnapshot {
    Dashboard(DashboardView),
    Productos(ProductsView),
    Entradas(MovementsView),
    Salidas(MovementsView),
    Caducidad(ExpiryView),
}

impl ViewSnapshot {
    pub fn view(&self) -> View {
        match self {
            ViewSnapshot::Dashboard(_) => View::Dashboard,
            ViewSnapshot::Productos(_) => View::Productos,
            ViewSnapshot::Entradas(_) => View::Entradas,
            ViewSnapshot::Salidas(_) => View::Salidas,
            ViewSnapshot::Caducidad(_) => View::Caducidad,
        }
    }
}

/// Mount `view` and render it.
pub async fn load(view: View, ctx: &ViewContext) -> AppResult<ViewSnapshot> {
    Ok(match view {
        View::Dashboard => ViewSnapshot::Dashboard(DashboardView::load(ctx).await?),
        View::Productos => ViewSnapshot::Productos(ProductsScreen::mount(ctx).await?.render()),
        View::Entradas => {
            ViewSnapshot::Entradas(MovementScreen::mount(ctx, MovementKind::Inbound).await?.render())
        }
        View::Salidas => {
            ViewSnapshot::Salidas(MovementScreen::mount(ctx, MovementKind::Outbound).await?.render())
        }
        View::Caducidad => ViewSnapshot::Caducidad(ExpiryView::load(ctx).await?),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use chrono::Duration;

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    pub fn product(id: i64, name: &str, stock: u32, offset_days: Option<i64>) -> Product {
        Product {
            expiration_date: offset_days
                .map(|d| (today() + Duration::days(d)).format("%Y-%m-%d").to_string()),
            ..Product::new(id, name, 1.5, stock)
        }
    }

    pub fn context(gateway: Arc<InMemoryGateway>) -> ViewContext {
        ViewContext {
            gateway,
            today: today(),
            default_shelf_life_days: 30,
            recent_limit: 5,
        }
    }
}
