use serde::Serialize;

use super::{ProductRow, ViewContext};
use crate::error::AppResult;

/// Caducidad screen: every product with its expiration badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiryView {
    pub products: Vec<ProductRow>,
}

impl ExpiryView {
    pub async fn load(ctx: &ViewContext) -> AppResult<Self> {
        let products = ctx
            .gateway
            .list_products()
            .await?
            .into_iter()
            .map(|p| ProductRow::new(p, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { products })
    }
}
