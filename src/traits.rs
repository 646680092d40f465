//! Traits for data-source abstraction

use async_trait::async_trait;

use crate::analytics::{OrderRecord, Product, RetailData, User};
use crate::types::*;

/// Read access to the store's collections
///
/// The engine itself performs no I/O. Implement this over whatever document
/// store holds orders, products and users, and hand it to a
/// [`Dashboard`](crate::dashboard::Dashboard).
#[async_trait]
pub trait RetailDataSource: Send + Sync {
    /// Fetch every stored order, in either historical shape
    async fn fetch_orders(&self) -> EngineResult<Vec<OrderRecord>>;

    /// Fetch the product catalogue
    async fn fetch_products(&self) -> EngineResult<Vec<Product>>;

    /// Fetch application users
    async fn fetch_users(&self) -> EngineResult<Vec<User>>;

    /// Fetch all three collections
    async fn fetch_all(&self) -> EngineResult<RetailData> {
        Ok(RetailData {
            orders: self.fetch_orders().await?,
            products: self.fetch_products().await?,
            users: self.fetch_users().await?,
        })
    }
}
