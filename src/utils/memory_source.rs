//! In-memory data source for testing and demos

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::analytics::{OrderRecord, Product, User};
use crate::traits::*;
use crate::types::*;

/// In-memory collections behind shared locks
#[derive(Debug, Clone, Default)]
pub struct MemoryDataSource {
    orders: Arc<RwLock<Vec<OrderRecord>>>,
    products: Arc<RwLock<Vec<Product>>>,
    users: Arc<RwLock<Vec<User>>>,
}

impl MemoryDataSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: OrderRecord) -> EngineResult<()> {
        self.orders.write().map_err(poisoned)?.push(order);
        Ok(())
    }

    pub fn insert_product(&self, product: Product) -> EngineResult<()> {
        self.products.write().map_err(poisoned)?.push(product);
        Ok(())
    }

    pub fn insert_user(&self, user: User) -> EngineResult<()> {
        self.users.write().map_err(poisoned)?.push(user);
        Ok(())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> EngineResult<()> {
        self.orders.write().map_err(poisoned)?.clear();
        self.products.write().map_err(poisoned)?.clear();
        self.users.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

fn poisoned<T>(_: T) -> EngineError {
    EngineError::Source("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl RetailDataSource for MemoryDataSource {
    async fn fetch_orders(&self) -> EngineResult<Vec<OrderRecord>> {
        Ok(self.orders.read().map_err(poisoned)?.clone())
    }

    async fn fetch_products(&self) -> EngineResult<Vec<Product>> {
        Ok(self.products.read().map_err(poisoned)?.clone())
    }

    async fn fetch_users(&self) -> EngineResult<Vec<User>> {
        Ok(self.users.read().map_err(poisoned)?.clone())
    }
}
