//! Dashboard orchestrator that pulls records from a data source and runs the
//! analytics reducer over them

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use crate::analytics::{
    compute_analytics_with, low_stock, AnalyticsBundle, AnalyticsFilter, LowStockItem, OrderRecord,
    RawTimestamp,
};
use crate::config::EngineConfig;
use crate::money;
use crate::traits::*;
use crate::types::*;

/// Read-side view over a [`RetailDataSource`]
pub struct Dashboard<S: RetailDataSource> {
    source: S,
    config: EngineConfig,
}

impl<S: RetailDataSource> Dashboard<S> {
    /// Create a dashboard with the default configuration
    pub fn new(source: S) -> Self {
        Self::with_config(source, EngineConfig::default())
    }

    pub fn with_config(source: S, config: EngineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Render an amount in the configured default locale
    pub fn format_money(&self, amount: &BigDecimal) -> String {
        money::format_money(amount, self.config.default_locale)
    }

    /// Fetch the current snapshot and reduce it for `filter`
    pub async fn analytics(
        &self,
        filter: &AnalyticsFilter,
        now: DateTime<FixedOffset>,
    ) -> EngineResult<AnalyticsBundle> {
        let data = self.source.fetch_all().await?;
        debug!(
            orders = data.orders.len(),
            products = data.products.len(),
            users = data.users.len(),
            "loaded dashboard snapshot"
        );
        compute_analytics_with(&data, filter, now, &self.config)
    }

    /// Products that need restocking, capped by the configured limit
    pub async fn low_stock(&self) -> EngineResult<Vec<LowStockItem>> {
        let products = self.source.fetch_products().await?;
        Ok(low_stock(&products, self.config.low_stock_limit))
    }

    /// Orders placed by one user, newest first
    ///
    /// Orders without a readable timestamp sort last.
    pub async fn order_history(&self, user_id: &str) -> EngineResult<Vec<OrderRecord>> {
        let mut orders: Vec<OrderRecord> = self
            .source
            .fetch_orders()
            .await?
            .into_iter()
            .filter(|order| order.created_by.as_deref() == Some(user_id))
            .collect();

        orders.sort_by(|a, b| {
            placed_at(b)
                .cmp(&placed_at(a))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(orders)
    }
}

fn placed_at(order: &OrderRecord) -> Option<DateTime<Utc>> {
    order.created_at.as_ref().and_then(RawTimestamp::to_instant)
}
