//! Dashboard analytics over an in-memory data source

use bigdecimal::BigDecimal;
use chrono::{Duration, FixedOffset, Utc};
use retail_core::money::to_display;
use retail_core::{
    AnalyticsFilter, Category, Dashboard, DateRange, MemoryDataSource, OrderLine, OrderRecord,
    OrderStatus, OrderType, Product, Role, User,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("📈 Retail Core - Dashboard Analytics Example\n");

    let source = MemoryDataSource::new();
    source.insert_product(Product::new("p-saree", "Silk Saree", "SAR-014", Category::Women, 3, 5))?;
    source.insert_product(Product::new("p-shirt", "Linen Shirt", "SHT-102", Category::Men, 0, 4))?;
    source.insert_product(Product::new("p-frock", "Party Frock", "FRK-310", Category::Kids, 25, 5))?;
    source.insert_user(User {
        id: "u-ravi".to_string(),
        name: Some("Ravi".to_string()),
        email: None,
        role: Role::Employee,
    })?;

    let now = Utc::now();
    let seed = [
        ("o-1", "p-saree", 2, 10498, 1),
        ("o-2", "p-shirt", 1, 1399, 3),
        ("o-3", "p-frock", 3, 2697, 9),
        ("o-4", "p-saree", 1, 5249, 40),
    ];
    for (id, product, quantity, payable, days_ago) in seed {
        let line = OrderLine {
            product_id: Some(product.to_string()),
            quantity,
            line_total: Some(BigDecimal::from(payable)),
            ..OrderLine::default()
        };
        source.insert_order(
            OrderRecord::with_items(id, vec![line], Some(BigDecimal::from(payable)))
                .with_status(OrderStatus::Completed)
                .with_order_type(OrderType::Store)
                .created_at(now - Duration::days(days_ago))
                .created_by("u-ravi"),
        )?;
    }
    // Legacy single-item record
    source.insert_order(
        OrderRecord::legacy("o-legacy", "p-shirt", BigDecimal::from(1299), 2)
            .with_status(OrderStatus::Completed)
            .created_at(now - Duration::days(2)),
    )?;

    let ist = FixedOffset::east_opt(5 * 3600 + 1800).ok_or("invalid offset")?;
    let dashboard = Dashboard::new(source);
    let bundle = dashboard
        .analytics(&AnalyticsFilter::new(DateRange::Month), now.with_timezone(&ist))
        .await?;

    println!("💰 Revenue:  {} ({}% vs previous)", dashboard.format_money(&bundle.current.total_revenue), to_display(&bundle.growth.revenue));
    println!("🧾 Orders:   {}", bundle.current.total_orders);
    println!("📦 Items:    {}", bundle.current.total_items_sold);
    println!("🛒 AOV:      {}", dashboard.format_money(&bundle.current.avg_order_value));
    println!();

    println!("🏆 Top Products:");
    for product in bundle.top_products.iter().take(5) {
        println!("  {:<14} {:>12}  ({} sold)", product.name, dashboard.format_money(&product.revenue), product.quantity_sold);
    }
    println!();

    println!("⚠️  Low Stock:");
    for item in &bundle.low_stock {
        println!("  {:<14} {} left (threshold {})", item.name, item.stock_qty, item.low_stock_threshold);
    }
    println!();

    println!("💡 Insights:");
    for insight in &bundle.insights {
        println!("  [{:?}] {}: {}", insight.kind, insight.title, insight.message);
    }

    Ok(())
}
