//! Analytics reduction over raw orders, products and users
//!
//! The reducer indexes products and users once, normalizes both stored order
//! shapes into one internal form, then runs independent passes for KPIs,
//! trend, product, category and employee breakdowns.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::analytics::insights::{derive_insights, Insight, InsightInputs};
use crate::analytics::records::*;
use crate::analytics::window::{current_window, AnalyticsFilter, DateRange, Selection, TimeWindow};
use crate::config::EngineConfig;
use crate::money::{average, growth_percent};
use crate::types::*;

/// Headline figures for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMetrics {
    pub total_revenue: BigDecimal,
    pub total_orders: u64,
    pub total_items_sold: i64,
    pub avg_order_value: BigDecimal,
}

impl PeriodMetrics {
    fn from_orders(orders: &[&NormalizedOrder<'_>]) -> Self {
        let total_revenue: BigDecimal = orders.iter().map(|order| &order.revenue).sum();
        let total_orders = orders.len() as u64;
        Self {
            avg_order_value: average(&total_revenue, total_orders),
            total_items_sold: orders.iter().map(|order| order.items_sold).sum(),
            total_orders,
            total_revenue,
        }
    }
}

/// Percentage change of each KPI against the previous window, unrounded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthMetrics {
    pub revenue: BigDecimal,
    pub orders: BigDecimal,
    pub items: BigDecimal,
    pub aov: BigDecimal,
}

impl GrowthMetrics {
    fn between(current: &PeriodMetrics, previous: &PeriodMetrics) -> Self {
        let current_aov = exact_average(&current.total_revenue, current.total_orders);
        let previous_aov = exact_average(&previous.total_revenue, previous.total_orders);
        Self {
            revenue: growth_percent(&current.total_revenue, &previous.total_revenue),
            orders: growth_percent(
                &BigDecimal::from(current.total_orders),
                &BigDecimal::from(previous.total_orders),
            ),
            items: growth_percent(
                &BigDecimal::from(current.total_items_sold),
                &BigDecimal::from(previous.total_items_sold),
            ),
            aov: growth_percent(&current_aov, &previous_aov),
        }
    }
}

/// Revenue and order count for one local day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub revenue: BigDecimal,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPerformance {
    pub product_id: String,
    /// Catalogue name, `Unknown` when the product is not in the catalogue
    pub name: String,
    pub sku: Option<String>,
    pub category: Category,
    pub revenue: BigDecimal,
    pub quantity_sold: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPerformance {
    pub category: Category,
    pub revenue: BigDecimal,
    /// Orders containing at least one item of this category
    pub orders: u64,
    pub avg_value: BigDecimal,
    /// Revenue growth against the same category in the previous window
    pub growth: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePerformance {
    /// Creator user id; `None` for orders that recorded no creator
    pub employee_id: Option<String>,
    pub name: String,
    pub revenue: BigDecimal,
    pub orders: u64,
    pub avg_order: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub category: Category,
    pub stock_qty: u32,
    pub low_stock_threshold: u32,
}

impl From<&Product> for LowStockItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            category: product.category,
            stock_qty: product.stock_qty,
            low_stock_threshold: product.low_stock_threshold,
        }
    }
}

/// Everything the dashboard renders for one filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsBundle {
    pub window: TimeWindow,
    pub previous_window: TimeWindow,
    pub current: PeriodMetrics,
    pub previous: PeriodMetrics,
    pub growth: GrowthMetrics,
    pub revenue_trend: Vec<TrendPoint>,
    /// Every product sold in the window, best first; callers take the top N
    pub top_products: Vec<ProductPerformance>,
    pub category_performance: Vec<CategoryPerformance>,
    pub employee_performance: Vec<EmployeePerformance>,
    pub low_stock: Vec<LowStockItem>,
    pub insights: Vec<Insight>,
}

struct NormalizedLine<'a> {
    product_id: Option<&'a str>,
    category: Category,
    quantity: i64,
    revenue: BigDecimal,
}

/// Completed order reduced to the fields analytics reads
struct NormalizedOrder<'a> {
    placed_at: DateTime<Utc>,
    order_type: Option<OrderType>,
    created_by: Option<&'a str>,
    revenue: BigDecimal,
    items_sold: i64,
    lines: Vec<NormalizedLine<'a>>,
}

impl<'a> NormalizedOrder<'a> {
    fn from_record(record: &'a OrderRecord, products: &HashMap<&str, &Product>) -> Option<Self> {
        let placed_at = match record.created_at.as_ref().and_then(RawTimestamp::to_instant) {
            Some(instant) => instant,
            None => {
                warn!(order_id = %record.id, "order has no readable timestamp; skipped");
                return None;
            }
        };

        let category_of = |product_id: Option<&str>, fallback: Option<Category>| {
            product_id
                .and_then(|id| products.get(id))
                .map(|product| product.category)
                .or(fallback)
                .unwrap_or(Category::Other)
        };

        let revenue = record.revenue();
        let lines = match &record.body {
            OrderBody::LineItems { items, .. } => items
                .iter()
                .map(|item| NormalizedLine {
                    product_id: item.product_id.as_deref(),
                    category: category_of(item.product_id.as_deref(), item.category),
                    quantity: item.quantity,
                    revenue: item.revenue().unwrap_or_else(|| BigDecimal::from(0)),
                })
                .collect(),
            OrderBody::Legacy {
                product_id,
                quantity,
                ..
            } => vec![NormalizedLine {
                product_id: product_id.as_deref(),
                category: category_of(product_id.as_deref(), None),
                quantity: quantity.unwrap_or(0),
                revenue: revenue.clone(),
            }],
        };

        Some(Self {
            placed_at,
            order_type: record.order_type,
            created_by: record.created_by.as_deref(),
            items_sold: record.items_sold(),
            revenue,
            lines,
        })
    }

    fn matches(&self, filter: &AnalyticsFilter) -> bool {
        let employee_ok = match &filter.employee {
            Selection::All => true,
            Selection::Only(user_id) => self.created_by == Some(user_id.as_str()),
        };
        let category_ok = filter.category == Selection::All
            || self
                .lines
                .iter()
                .any(|line| filter.category.matches(&line.category));

        filter.order_type.matches_opt(self.order_type.as_ref()) && employee_ok && category_ok
    }
}

/// Compute the analytics bundle with the default configuration
pub fn compute_analytics(
    data: &RetailData,
    filter: &AnalyticsFilter,
    now: DateTime<FixedOffset>,
) -> EngineResult<AnalyticsBundle> {
    compute_analytics_with(data, filter, now, &EngineConfig::default())
}

/// Compute the analytics bundle for `filter` as of `now`.
///
/// Only completed orders count. Empty collections produce zeroed metrics and
/// empty lists; the only failure is an invalid date range.
pub fn compute_analytics_with(
    data: &RetailData,
    filter: &AnalyticsFilter,
    now: DateTime<FixedOffset>,
    config: &EngineConfig,
) -> EngineResult<AnalyticsBundle> {
    let window = current_window(&filter.date_range, now)?;
    let previous_window = window.previous();

    let products: HashMap<&str, &Product> = data
        .products
        .iter()
        .map(|product| (product.id.as_str(), product))
        .collect();
    let users: HashMap<&str, &User> = data
        .users
        .iter()
        .map(|user| (user.id.as_str(), user))
        .collect();

    let completed: Vec<NormalizedOrder<'_>> = data
        .orders
        .iter()
        .filter(|order| order.is_completed())
        .filter_map(|order| NormalizedOrder::from_record(order, &products))
        .collect();

    let current_orders = orders_in(&completed, &window, filter);
    let previous_orders = orders_in(&completed, &previous_window, filter);

    debug!(
        start = %window.start,
        end = %window.end,
        previous_start = %previous_window.start,
        completed = completed.len(),
        current = current_orders.len(),
        previous = previous_orders.len(),
        "reducing analytics"
    );

    let current = PeriodMetrics::from_orders(&current_orders);
    let previous = PeriodMetrics::from_orders(&previous_orders);
    let growth = GrowthMetrics::between(&current, &previous);

    let earliest = completed.iter().map(|order| order.placed_at).min();
    let revenue_trend = revenue_trend(&current_orders, earliest, &window, &filter.date_range, now);
    let top_products = top_products(&current_orders, &products);
    let category_performance = category_performance(&current_orders, &previous_orders);
    let employee_performance = employee_performance(&current_orders, &users);
    let low_stock = low_stock(&data.products, config.low_stock_limit);

    let insights = derive_insights(
        &InsightInputs {
            growth: &growth,
            top_products: &top_products,
            category_performance: &category_performance,
            low_stock: &low_stock,
        },
        config,
    );

    Ok(AnalyticsBundle {
        window,
        previous_window,
        current,
        previous,
        growth,
        revenue_trend,
        top_products,
        category_performance,
        employee_performance,
        low_stock,
        insights,
    })
}

/// Products at or below their reorder threshold, emptiest first
pub fn low_stock(products: &[Product], limit: usize) -> Vec<LowStockItem> {
    let mut low: Vec<&Product> = products.iter().filter(|p| p.is_low_stock()).collect();
    low.sort_by(|a, b| a.stock_qty.cmp(&b.stock_qty).then_with(|| a.id.cmp(&b.id)));
    low.into_iter().take(limit).map(LowStockItem::from).collect()
}

fn orders_in<'o, 'a>(
    orders: &'o [NormalizedOrder<'a>],
    bounds: &TimeWindow,
    filter: &AnalyticsFilter,
) -> Vec<&'o NormalizedOrder<'a>> {
    orders
        .iter()
        .filter(|order| bounds.contains(order.placed_at) && order.matches(filter))
        .collect()
}

fn exact_average(total: &BigDecimal, count: u64) -> BigDecimal {
    if count == 0 {
        BigDecimal::from(0)
    } else {
        total / BigDecimal::from(count)
    }
}

/// Daily points across the window, zero-filled.
///
/// Empty only when there are no completed orders at all. For `all` the
/// series starts at the earliest completed order's day.
fn revenue_trend(
    orders: &[&NormalizedOrder<'_>],
    earliest: Option<DateTime<Utc>>,
    window: &TimeWindow,
    range: &DateRange,
    now: DateTime<FixedOffset>,
) -> Vec<TrendPoint> {
    let offset = *now.offset();
    let local_day = |instant: DateTime<Utc>| instant.with_timezone(&offset).date_naive();

    let mut per_day: BTreeMap<NaiveDate, (BigDecimal, u64)> = BTreeMap::new();
    for order in orders {
        let entry = per_day
            .entry(local_day(order.placed_at))
            .or_insert_with(|| (BigDecimal::from(0), 0));
        entry.0 += &order.revenue;
        entry.1 += 1;
    }

    let Some(earliest) = earliest else {
        return Vec::new();
    };
    let first_day = match range {
        DateRange::All => local_day(earliest),
        _ => local_day(window.start),
    };
    let last_day = local_day(window.end);

    let mut trend = Vec::new();
    let mut day = first_day;
    while day <= last_day {
        let (revenue, orders) = per_day
            .get(&day)
            .cloned()
            .unwrap_or_else(|| (BigDecimal::from(0), 0));
        trend.push(TrendPoint {
            date: day,
            revenue,
            orders,
        });
        day += Duration::days(1);
    }
    trend
}

fn top_products(
    orders: &[&NormalizedOrder<'_>],
    products: &HashMap<&str, &Product>,
) -> Vec<ProductPerformance> {
    let mut sales: BTreeMap<&str, (BigDecimal, i64, Category)> = BTreeMap::new();
    for line in orders.iter().flat_map(|order| order.lines.iter()) {
        let Some(product_id) = line.product_id else {
            continue;
        };
        let entry = sales
            .entry(product_id)
            .or_insert_with(|| (BigDecimal::from(0), 0, line.category));
        entry.0 += &line.revenue;
        entry.1 += line.quantity;
        // lines may disagree for uncatalogued products; keep the lowest
        entry.2 = entry.2.min(line.category);
    }

    let mut ranked: Vec<ProductPerformance> = sales
        .into_iter()
        .map(|(product_id, (revenue, quantity_sold, line_category))| {
            let product = products.get(product_id);
            if product.is_none() {
                warn!(product_id, "sold product missing from catalogue");
            }
            ProductPerformance {
                product_id: product_id.to_string(),
                name: product
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                sku: product.map(|p| p.sku.clone()),
                category: product.map(|p| p.category).unwrap_or(line_category),
                revenue,
                quantity_sold,
            }
        })
        .collect();

    // stable: ties keep ascending product id from the BTreeMap
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranked
}

fn revenue_by_category(orders: &[&NormalizedOrder<'_>]) -> BTreeMap<Category, (BigDecimal, u64)> {
    let mut totals: BTreeMap<Category, (BigDecimal, u64)> = BTreeMap::new();
    for order in orders {
        let mut seen = BTreeSet::new();
        for line in &order.lines {
            let entry = totals
                .entry(line.category)
                .or_insert_with(|| (BigDecimal::from(0), 0));
            entry.0 += &line.revenue;
            if seen.insert(line.category) {
                entry.1 += 1;
            }
        }
    }
    totals
}

fn category_performance(
    current: &[&NormalizedOrder<'_>],
    previous: &[&NormalizedOrder<'_>],
) -> Vec<CategoryPerformance> {
    let previous_totals = revenue_by_category(previous);
    let zero = BigDecimal::from(0);

    let mut categories: Vec<CategoryPerformance> = revenue_by_category(current)
        .into_iter()
        .map(|(category, (revenue, orders))| {
            let previous_revenue = previous_totals
                .get(&category)
                .map(|(revenue, _)| revenue)
                .unwrap_or(&zero);
            CategoryPerformance {
                category,
                avg_value: average(&revenue, orders),
                growth: growth_percent(&revenue, previous_revenue),
                revenue,
                orders,
            }
        })
        .collect();

    categories.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    categories
}

fn employee_performance(
    orders: &[&NormalizedOrder<'_>],
    users: &HashMap<&str, &User>,
) -> Vec<EmployeePerformance> {
    let mut totals: BTreeMap<Option<&str>, (BigDecimal, u64)> = BTreeMap::new();
    for order in orders {
        let entry = totals
            .entry(order.created_by)
            .or_insert_with(|| (BigDecimal::from(0), 0));
        entry.0 += &order.revenue;
        entry.1 += 1;
    }

    let mut employees: Vec<EmployeePerformance> = totals
        .into_iter()
        .map(|(employee_id, (revenue, orders))| EmployeePerformance {
            name: employee_id
                .and_then(|id| users.get(id))
                .map(|user| user.display_name())
                .unwrap_or_else(|| "Unknown".to_string()),
            employee_id: employee_id.map(str::to_string),
            avg_order: average(&revenue, orders),
            revenue,
            orders,
        })
        .collect();

    employees.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    employees
}
