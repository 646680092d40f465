//! Integration tests for retail-core

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use retail_core::{
    calculate_order, compute_analytics, current_window, format_money, generate_bill,
    AnalyticsFilter, BillMetadata, Cart, CartItem, Category, Customer, Dashboard, DateRange,
    EngineError, GstRate, Locale, MemoryDataSource, OrderLine, OrderRecord, OrderStatus,
    OrderType, Product, RetailData, Role, SellerInfo, User,
};

fn dec(s: &str) -> BigDecimal {
    s.parse().unwrap()
}

fn within(a: &BigDecimal, b: &BigDecimal, tolerance: &str) -> bool {
    (a - b).abs() <= dec(tolerance)
}

fn ist() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
}

fn now() -> DateTime<FixedOffset> {
    ist().with_ymd_and_hms(2026, 3, 20, 18, 0, 0).unwrap()
}

fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, month, day, hour, 0, 0).unwrap()
}

fn item(id: &str, quantity: i64, price: &str, rate: u32) -> CartItem {
    CartItem::new(
        id,
        id.to_uppercase(),
        format!("SKU-{}", id),
        Category::Women,
        quantity,
        dec(price),
        rate,
    )
}

fn sample_carts() -> Vec<Cart> {
    vec![
        Cart::new(vec![item("p1", 2, "999", 12)]),
        Cart::new(vec![
            item("saree", 1, "4999", 5),
            item("kurti", 2, "1499", 12).on_sale(dec("1199")),
            item("dress", 1, "1999", 12).on_sale(dec("1599")),
        ]),
        Cart::new(vec![item("p3", 3, "2499", 12)]).with_employee_discount(dec("10")),
        Cart::new(vec![
            item("p4", 1, "1180", 18).tax_inclusive(),
            item("p5", 4, "333.33", 28),
            item("p6", 1, "250", 0),
        ])
        .with_employee_discount(dec("12.5")),
        Cart::new(vec![item("p7", 7, "105", 5)
            .tax_inclusive()
            .with_line_discount(dec("15"))]),
        // non-terminating inclusive splits
        Cart::new(vec![
            item("p8", 3, "999", 12).tax_inclusive(),
            item("p9", 2, "1499", 18).tax_inclusive(),
            item("p10", 1, "649", 5).tax_inclusive(),
        ])
        .with_employee_discount(dec("7")),
    ]
}

fn metadata() -> BillMetadata {
    BillMetadata {
        order_id: "ord-2001".to_string(),
        order_type: "store".to_string(),
        employee_id: "u-2".to_string(),
        employee_name: "Ravi".to_string(),
        exhibition_id: None,
        customer: Customer {
            name: "Kavya".to_string(),
            phone: "9811111111".to_string(),
            address: String::new(),
        },
    }
}

fn seller() -> SellerInfo {
    SellerInfo {
        name: "Threadline Boutique".to_string(),
        address: "12 MG Road, Bengaluru".to_string(),
        phone: "080-1234567".to_string(),
        email: "hello@threadline.in".to_string(),
        gstin: "29ABCDE1234F1Z5".to_string(),
    }
}

fn completed(id: &str, payable: &str, placed: DateTime<Utc>, user: &str) -> OrderRecord {
    OrderRecord::with_items(
        id,
        vec![OrderLine {
            product_id: Some("p1".to_string()),
            quantity: 1,
            line_total: Some(dec(payable)),
            ..OrderLine::default()
        }],
        Some(dec(payable)),
    )
    .with_status(OrderStatus::Completed)
    .with_order_type(OrderType::Store)
    .created_at(placed)
    .created_by(user)
}

#[test]
fn test_simple_store_sale() {
    let order = calculate_order(&Cart::new(vec![item("p1", 2, "999", 12)])).unwrap();

    assert_eq!(order.subtotal_exclusive, dec("1998"));
    assert_eq!(order.total_tax, dec("239.76"));
    assert_eq!(order.grand_total, dec("2237.76"));
    assert_eq!(order.payable_amount, dec("2238"));
    assert_eq!(order.rounding_adjustment, dec("0.24"));
}

#[test]
fn test_mixed_gst_with_sale_prices() {
    let order = calculate_order(&sample_carts()[1]).unwrap();

    assert_eq!(order.subtotal_exclusive, dec("9996"));
    assert_eq!(order.gst_breakdown.len(), 2);
    assert_eq!(order.gst_breakdown[&GstRate::Five].taxable, dec("4999"));
    assert_eq!(order.gst_breakdown[&GstRate::Five].tax, dec("249.95"));
    assert_eq!(order.gst_breakdown[&GstRate::Twelve].taxable, dec("3997"));
    assert_eq!(order.gst_breakdown[&GstRate::Twelve].tax, dec("479.64"));
    assert_eq!(order.total_tax, dec("729.59"));
    assert_eq!(order.grand_total, dec("10725.59"));
    assert_eq!(order.payable_amount, dec("10726"));
}

#[test]
fn test_employee_discount_uniform_rate() {
    let order = calculate_order(&sample_carts()[2]).unwrap();

    assert_eq!(order.subtotal_exclusive, dec("7497"));
    assert_eq!(order.discount_amount, dec("749.70"));
    assert_eq!(order.taxable_after_discount, dec("6747.30"));
    assert_eq!(order.total_tax, dec("809.676"));
    assert_eq!(order.payable_amount, dec("7557"));
}

#[test]
fn test_order_invariants_hold_for_sample_carts() {
    for cart in sample_carts() {
        let order = calculate_order(&cart).unwrap();

        let identity = &order.subtotal_exclusive - &order.discount_amount + &order.total_tax;
        assert!(within(&order.grand_total, &identity, "0.000001"));

        for line in &order.lines {
            let expected = &line.line_taxable_base * (BigDecimal::from(1) + line.gst_rate.fraction());
            assert!(within(&line.line_total, &expected, "0.000001"));
        }

        let line_bases: BigDecimal = order.lines.iter().map(|l| &l.line_taxable_base).sum();
        assert_eq!(line_bases, order.subtotal_exclusive);

        let bucket_tax: BigDecimal = order.gst_breakdown.values().map(|b| &b.tax).sum();
        assert!(within(&bucket_tax, &order.total_tax, "0.000001"));

        assert!(within(&order.payable_amount, &order.grand_total, "0.5"));
        assert_eq!(order.payable_amount, order.payable_amount.round(0));
    }
}

#[test]
fn test_inclusive_and_exclusive_prices_agree() {
    let inclusive =
        calculate_order(&Cart::new(vec![item("p1", 1, "112", 12).tax_inclusive()])).unwrap();
    let exclusive = calculate_order(&Cart::new(vec![item("p1", 1, "100", 12)])).unwrap();

    assert_eq!(inclusive.payable_amount, exclusive.payable_amount);
    assert_eq!(inclusive.payable_amount, dec("112"));
}

#[test]
fn test_zero_discount_matches_no_discount() {
    let items = sample_carts()[1].items.clone();
    let without = calculate_order(&Cart::new(items.clone())).unwrap();
    let with_zero = calculate_order(&Cart::new(items).with_employee_discount(dec("0"))).unwrap();

    assert_eq!(without, with_zero);
}

#[test]
fn test_invalid_carts_are_rejected() {
    let rejected = [
        Cart::new(vec![]),
        Cart::new(vec![item("p1", 0, "100", 12)]),
        Cart::new(vec![item("p1", 1, "100", 7)]),
        Cart::new(vec![item("p1", 1, "-1", 12)]),
        Cart::new(vec![item("p1", 1, "100", 12)]).with_employee_discount(dec("100.5")),
    ];

    for cart in rejected {
        assert!(matches!(
            calculate_order(&cart),
            Err(EngineError::InvalidCart(_))
        ));
    }
}

#[test]
fn test_bill_is_deterministic() {
    let issued = at(3, 14, 10);
    for cart in sample_carts() {
        let first = generate_bill(&calculate_order(&cart).unwrap(), &metadata(), &seller(), issued)
            .unwrap();
        let second =
            generate_bill(&calculate_order(&cart).unwrap(), &metadata(), &seller(), issued)
                .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[test]
fn test_bill_rejects_unknown_order_type() {
    let calculation = calculate_order(&sample_carts()[0]).unwrap();
    let mut meta = metadata();
    meta.order_type = "online".to_string();

    assert!(matches!(
        generate_bill(&calculation, &meta, &seller(), at(3, 14, 10)),
        Err(EngineError::InvalidBillMetadata(_))
    ));
}

#[test]
fn test_bill_payable_display() {
    let calculation = calculate_order(&sample_carts()[1]).unwrap();
    let bill = generate_bill(&calculation, &metadata(), &seller(), at(3, 14, 10)).unwrap();

    assert_eq!(bill.formatted_payable(Locale::EnIn), "₹10,726.00");
    assert_eq!(format_money(&calculation.grand_total, Locale::EnUs), "$10,725.59");
}

#[test]
fn test_analytics_empty_input() {
    let bundle = compute_analytics(
        &RetailData::default(),
        &AnalyticsFilter::new(DateRange::Month),
        now(),
    )
    .unwrap();

    assert_eq!(bundle.current.total_revenue, dec("0"));
    assert_eq!(bundle.current.total_orders, 0);
    assert_eq!(bundle.current.total_items_sold, 0);
    assert_eq!(bundle.current.avg_order_value, dec("0"));
    assert_eq!(bundle.growth.revenue, dec("0"));
    assert!(bundle.revenue_trend.is_empty());
    assert!(bundle.top_products.is_empty());
    assert!(bundle.category_performance.is_empty());
    assert!(bundle.employee_performance.is_empty());
    assert!(bundle.low_stock.is_empty());
    assert!(bundle.insights.is_empty());
}

#[test]
fn test_analytics_growth_and_insights() {
    let data = RetailData {
        orders: vec![
            completed("o-now", "150", at(3, 10, 6), "u-1"),
            completed("o-before", "100", at(2, 20, 6), "u-1"),
        ],
        ..RetailData::default()
    };

    let bundle = compute_analytics(&data, &AnalyticsFilter::new(DateRange::Month), now()).unwrap();
    let titles: Vec<&str> = bundle.insights.iter().map(|i| i.title.as_str()).collect();

    assert!(within(&bundle.growth.revenue, &dec("50"), "0.000001"));
    assert!(titles.contains(&"Strong Revenue Growth"));
    assert!(!titles.contains(&"Revenue Decline"));
}

#[test]
fn test_legacy_order_shape() {
    let raw = r#"{
        "orders": [{
            "id": "legacy-1",
            "status": "completed",
            "orderType": "store",
            "createdAt": {"_seconds": 1773223200, "_nanoseconds": 0},
            "createdBy": "u-1",
            "productId": "p-legacy",
            "price": 500,
            "quantity": 2
        }],
        "products": [{
            "id": "p-legacy",
            "name": "Block Print Dupatta",
            "sku": "DUP-9",
            "category": "accessories",
            "stockQty": 12,
            "lowStockThreshold": 3
        }],
        "users": [{"id": "u-1", "email": "ravi@threadline.in", "role": "employee"}]
    }"#;
    let data: RetailData = serde_json::from_str(raw).unwrap();

    let bundle = compute_analytics(&data, &AnalyticsFilter::new(DateRange::Month), now()).unwrap();

    assert_eq!(bundle.current.total_revenue, dec("1000"));
    assert_eq!(bundle.current.total_items_sold, 2);
    assert_eq!(bundle.top_products.len(), 1);
    assert_eq!(bundle.top_products[0].product_id, "p-legacy");
    assert_eq!(bundle.top_products[0].revenue, dec("1000"));
    assert_eq!(bundle.top_products[0].category, Category::Accessories);
    assert_eq!(bundle.employee_performance[0].name, "ravi@threadline.in");

    let accessories = AnalyticsFilter::new(DateRange::Month).with_category(Category::Accessories);
    let filtered = compute_analytics(&data, &accessories, now()).unwrap();
    assert_eq!(filtered.current.total_orders, 1);
}

#[test]
fn test_analytics_ignores_input_order() {
    let mut data = RetailData {
        orders: vec![
            completed("o-1", "1200", at(3, 3, 5), "u-1"),
            completed("o-2", "800", at(3, 9, 5), "u-2"),
            completed("o-3", "1200", at(3, 12, 5), "u-2"),
            completed("o-4", "650", at(2, 25, 5), "u-1"),
            completed("o-5", "300", at(3, 14, 5), "u-3").with_status(OrderStatus::Cancelled),
        ],
        products: vec![
            Product::new("p1", "Kurta", "KUR-1", Category::Men, 0, 5),
            Product::new("p2", "Scarf", "SCF-1", Category::Accessories, 4, 5),
        ],
        users: vec![
            User {
                id: "u-1".to_string(),
                name: Some("Meera".to_string()),
                email: None,
                role: Role::Owner,
            },
            User {
                id: "u-2".to_string(),
                name: Some("Ravi".to_string()),
                email: None,
                role: Role::Employee,
            },
        ],
    };
    let filter = AnalyticsFilter::new(DateRange::Month);

    let first = compute_analytics(&data, &filter, now()).unwrap();
    assert_eq!(first, compute_analytics(&data, &filter, now()).unwrap());

    data.orders.reverse();
    data.products.reverse();
    data.users.reverse();
    let reordered = compute_analytics(&data, &filter, now()).unwrap();

    assert_eq!(first, reordered);
    assert_eq!(first.current.total_orders, 3);
    assert_eq!(first.previous.total_orders, 1);
}

#[test]
fn test_windows_are_disjoint_and_contiguous() {
    let ranges = [
        DateRange::Today,
        DateRange::Week,
        DateRange::Month,
        DateRange::Quarter,
        DateRange::Year,
        DateRange::Custom {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        },
        DateRange::All,
    ];

    for range in ranges {
        let current = current_window(&range, now()).unwrap();
        let previous = current.previous();

        assert!(previous.end < current.start);
        assert_eq!(previous.end + Duration::milliseconds(1), current.start);
        assert_eq!(current.start - previous.start, current.end - current.start);
    }
}

#[test]
fn test_inverted_custom_range_is_invalid() {
    let filter = AnalyticsFilter::new(DateRange::Custom {
        start_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
    });

    assert!(matches!(
        compute_analytics(&RetailData::default(), &filter, now()),
        Err(EngineError::InvalidFilter(_))
    ));
}

#[tokio::test]
async fn test_checkout_to_dashboard_workflow() {
    let source = MemoryDataSource::new();
    source
        .insert_product(Product::new("p1", "Saree", "SAR-1", Category::Women, 1, 2))
        .unwrap();
    source
        .insert_user(User {
            id: "u-2".to_string(),
            name: Some("Ravi".to_string()),
            email: None,
            role: Role::Employee,
        })
        .unwrap();

    // Bill two checkouts and persist them as completed orders
    for (order_id, day) in [("ord-1", 4), ("ord-2", 11)] {
        let calculation = calculate_order(&Cart::new(vec![item("p1", 1, "4999", 5)])).unwrap();
        let mut meta = metadata();
        meta.order_id = order_id.to_string();
        let bill = generate_bill(&calculation, &meta, &seller(), at(3, day, 8)).unwrap();
        source
            .insert_order(OrderRecord::from_bill(&bill, "u-2", "upi"))
            .unwrap();
    }

    let dashboard = Dashboard::new(source);
    let bundle = dashboard
        .analytics(&AnalyticsFilter::new(DateRange::Month), now())
        .await
        .unwrap();

    assert_eq!(bundle.current.total_orders, 2);
    assert_eq!(bundle.current.total_revenue, dec("10498"));
    assert_eq!(bundle.employee_performance[0].name, "Ravi");
    assert_eq!(bundle.top_products[0].name, "Saree");

    let history = dashboard.order_history("u-2").await.unwrap();
    assert_eq!(history[0].id, "ord-2");
    assert_eq!(dashboard.low_stock().await.unwrap().len(), 1);
}
