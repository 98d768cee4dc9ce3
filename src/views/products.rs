use serde::Serialize;
use tracing::info;

use super::ViewContext;
use crate::error::AppResult;
use crate::models::{Product, ProductForm};

/// Product table. Dates are shown as stored, without classification, so a
/// product with a broken date can still be edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductsView {
    pub products: Vec<Product>,
    pub count: usize,
}

/// The Productos screen: list, create, edit and delete.
pub struct ProductsScreen<'a> {
    ctx: &'a ViewContext,
    products: Vec<Product>,
}

impl<'a> ProductsScreen<'a> {
    pub async fn mount(ctx: &'a ViewContext) -> AppResult<ProductsScreen<'a>> {
        let products = ctx.gateway.list_products().await?;
        Ok(Self { ctx, products })
    }

    async fn reload(&mut self) -> AppResult<()> {
        self.products = self.ctx.gateway.list_products().await?;
        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn render(&self) -> ProductsView {
        ProductsView {
            products: self.products().to_vec(),
            count: self.products().len(),
        }
    }

    pub async fn create(&mut self, form: ProductForm) -> AppResult<Product> {
        let new_product = form.into_new_product(self.ctx.today, self.ctx.default_shelf_life_days)?;
        let product = self.ctx.gateway.create_product(&new_product).await?;
        info!(id = product.id, name = %product.name, "Created product");
        self.reload().await?;
        Ok(product)
    }

    /// Replace product `id` with the form's contents.
    pub async fn update(&mut self, id: i64, form: ProductForm) -> AppResult<Product> {
        let replacement = form
            .into_new_product(self.ctx.today, self.ctx.default_shelf_life_days)?
            .into_product(id);
        let product = self.ctx.gateway.update_product(&replacement).await?;
        info!(id, name = %product.name, "Updated product");
        self.reload().await?;
        Ok(product)
    }

    /// Movements that reference the product are left untouched.
    pub async fn delete(&mut self, id: i64) -> AppResult<()> {
        self.ctx.gateway.delete_product(id).await?;
        info!(id, "Deleted product");
        self.reload().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::*;
    use super::*;
    use crate::error::AppError;
    use crate::gateway::InMemoryGateway;

    fn form(name: &str, stock: u32, date: Option<&str>) -> ProductForm {
        ProductForm {
            name: Some(name.to_string()),
            price: Some(1.2),
            stock: Some(stock),
            expiration_date: date.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_reloads_and_defaults_date() {
        let ctx = context(Arc::new(InMemoryGateway::new()));
        let mut screen = ProductsScreen::mount(&ctx).await.unwrap();
        assert!(screen.products().is_empty());

        let created = screen.create(form("Aguacate", 8, None)).await.unwrap();
        assert_eq!(created.expiration_date.as_deref(), Some("2026-11-15"));
        assert_eq!(screen.render().count, 1);
        assert_eq!(screen.products()[0], created);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_gateway() {
        let gw = Arc::new(InMemoryGateway::new());
        let ctx = context(gw.clone());
        let mut screen = ProductsScreen::mount(&ctx).await.unwrap();
        gw.set_offline(true);

        let err = screen.create(ProductForm::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_replaces_whole_product() {
        let gw = Arc::new(InMemoryGateway::with_products([product(3, "Coco", 2, Some(10))]));
        let ctx = context(gw);
        let mut screen = ProductsScreen::mount(&ctx).await.unwrap();

        let updated = screen.update(3, form("Coco fresco", 9, Some("2026-12-24"))).await.unwrap();
        assert_eq!(updated.id, 3);
        assert_eq!(updated.stock, 9);
        assert_eq!(screen.products()[0].name, "Coco fresco");
        assert_eq!(screen.products()[0].expiration_date.as_deref(), Some("2026-12-24"));
    }

    #[tokio::test]
    async fn delete_reloads_and_unknown_id_is_not_found() {
        let gw = Arc::new(InMemoryGateway::with_products([
            product(1, "Lima", 1, None),
            product(2, "Pomelo", 1, None),
        ]));
        let ctx = context(gw);
        let mut screen = ProductsScreen::mount(&ctx).await.unwrap();

        screen.delete(1).await.unwrap();
        assert_eq!(screen.render().products.len(), 1);
        assert!(matches!(screen.delete(1).await, Err(AppError::NotFound(_))));
    }
}
