use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{DataGateway, RecordedMovement};
use crate::error::{AppError, AppResult};
use crate::models::{Movement, MovementKind, NewMovement, NewProduct, Product};

/// Process-local stand-in for the data API. Collections iterate in creation
/// order, the same order the API returns them in.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    store: RwLock<Store>,
    offline: AtomicBool,
}

#[derive(Debug, Default)]
struct Store {
    products: IndexMap<i64, Product>,
    inbound: IndexMap<i64, Movement>,
    outbound: IndexMap<i64, Movement>,
    next_product_id: i64,
    next_movement_id: i64,
}

impl Store {
    fn movements(&self, kind: MovementKind) -> &IndexMap<i64, Movement> {
        match kind {
            MovementKind::Inbound => &self.inbound,
            MovementKind::Outbound => &self.outbound,
        }
    }

    fn movements_mut(&mut self, kind: MovementKind) -> &mut IndexMap<i64, Movement> {
        match kind {
            MovementKind::Inbound => &mut self.inbound,
            MovementKind::Outbound => &mut self.outbound,
        }
    }

    fn insert_movement(&mut self, kind: MovementKind, movement: NewMovement) -> Movement {
        self.next_movement_id += 1;
        let movement = movement.into_movement(self.next_movement_id);
        self.movements_mut(kind).insert(movement.id, movement.clone());
        movement
    }
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway pre-filled with `products`, keeping their ids.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut store = Store::default();
        for product in products {
            store.next_product_id = store.next_product_id.max(product.id);
            store.products.insert(product.id, product);
        }
        Self {
            store: RwLock::new(store),
            offline: AtomicBool::new(false),
        }
    }

    /// While offline every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Network("data API unreachable".to_string()));
        }
        Ok(())
    }
}

fn product_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Product {} not found", id))
}

#[async_trait]
impl DataGateway for InMemoryGateway {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.ensure_online()?;
        Ok(self.store.read().await.products.values().cloned().collect())
    }

    async fn create_product(&self, product: &NewProduct) -> AppResult<Product> {
        self.ensure_online()?;
        let mut store = self.store.write().await;
        store.next_product_id += 1;
        let product = product.clone().into_product(store.next_product_id);
        store.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> AppResult<Product> {
        self.ensure_online()?;
        let mut store = self.store.write().await;
        let slot = store
            .products
            .get_mut(&product.id)
            .ok_or_else(|| product_not_found(product.id))?;
        *slot = product.clone();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: i64) -> AppResult<()> {
        self.ensure_online()?;
        // `shift_remove` keeps the remaining products in creation order.
        self.store
            .write()
            .await
            .products
            .shift_remove(&id)
            .map(|_| ())
            .ok_or_else(|| product_not_found(id))
    }

    async fn list_movements(&self, kind: MovementKind) -> AppResult<Vec<Movement>> {
        self.ensure_online()?;
        Ok(self.store.read().await.movements(kind).values().cloned().collect())
    }

    async fn create_movement(&self, kind: MovementKind, movement: &NewMovement) -> AppResult<Movement> {
        self.ensure_online()?;
        Ok(self.store.write().await.insert_movement(kind, movement.clone()))
    }

    /// Single write-lock section: the stock check runs against the stored
    /// product, and either both writes land or neither does.
    async fn record_movement(
        &self,
        kind: MovementKind,
        product: &Product,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> AppResult<RecordedMovement> {
        self.ensure_online()?;
        let mut store = self.store.write().await;

        let current = store
            .products
            .get(&product.id)
            .cloned()
            .ok_or_else(|| product_not_found(product.id))?;
        let new_stock = kind
            .apply(current.stock, quantity)
            .ok_or(AppError::InsufficientStock {
                product_id: current.id,
                requested: quantity,
                available: current.stock,
            })?;

        let updated = current.with_stock(new_stock);
        store.products.insert(updated.id, updated.clone());
        let movement = store.insert_movement(
            kind,
            NewMovement {
                product_id: updated.id,
                quantity,
                timestamp: at,
            },
        );
        debug!(product_id = updated.id, stock = updated.stock, %kind, "Movement recorded atomically");

        Ok(RecordedMovement {
            product: updated,
            movement,
        })
    }
}
