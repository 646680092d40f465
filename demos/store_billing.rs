//! Store checkout: cart calculation and bill generation

use bigdecimal::BigDecimal;
use chrono::Utc;
use retail_core::{
    calculate_order, format_money, generate_bill, new_order_id, BillMetadata, Cart, CartItem,
    Category, Customer, Locale, SellerInfo,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("🧾 Retail Core - Store Billing Example\n");

    // 1. Build a mixed-rate cart with a sale item and a staff discount
    let cart = Cart::new(vec![
        CartItem::new("p-saree", "Silk Saree", "SAR-014", Category::Women, 1, BigDecimal::from(4999), 5),
        CartItem::new("p-kurti", "Cotton Kurti", "KUR-221", Category::Women, 2, BigDecimal::from(1499), 12)
            .on_sale(BigDecimal::from(1199)),
        CartItem::new("p-belt", "Leather Belt", "BLT-007", Category::Accessories, 1, BigDecimal::from(1180), 18)
            .tax_inclusive(),
    ])
    .with_employee_discount(BigDecimal::from(5));

    let order = calculate_order(&cart)?;
    let locale = Locale::EnIn;

    println!("📦 Lines:");
    for line in &order.lines {
        println!(
            "  {:<14} x{}  {:>4}  taxable {:>12}  tax {:>10}",
            line.name,
            line.quantity,
            line.gst_rate,
            format_money(&line.line_taxable_base, locale),
            format_money(&line.line_tax, locale),
        );
    }
    println!();

    // 2. Turn the calculation into a bill
    let metadata = BillMetadata {
        order_id: new_order_id(),
        order_type: "store".to_string(),
        employee_id: "u-ravi".to_string(),
        employee_name: "Ravi".to_string(),
        exhibition_id: None,
        customer: Customer {
            name: "Kavya Menon".to_string(),
            phone: "9811111111".to_string(),
            address: "Koramangala, Bengaluru".to_string(),
        },
    };
    let seller = SellerInfo {
        name: "Threadline Boutique".to_string(),
        address: "12 MG Road, Bengaluru".to_string(),
        phone: "080-1234567".to_string(),
        email: "hello@threadline.in".to_string(),
        gstin: "29ABCDE1234F1Z5".to_string(),
    };
    let bill = generate_bill(&order, &metadata, &seller, Utc::now())?;

    println!("🏷️  Invoice {} for {}", bill.invoice_number(), bill.customer().name);
    println!("📊 GST Summary:");
    for row in bill.per_rate_summary() {
        println!(
            "  {:>4}  taxable {:>12}  CGST {:>10}  SGST {:>10}",
            row.rate,
            format_money(&row.taxable, locale),
            format_money(&row.cgst, locale),
            format_money(&row.sgst, locale),
        );
    }
    println!();

    let calc = bill.calculation();
    println!("  Subtotal:     {}", format_money(&calc.subtotal_exclusive, locale));
    println!("  Discount:     {}", format_money(&calc.discount_amount, locale));
    println!("  Total Tax:    {}", format_money(&calc.total_tax, locale));
    println!("  Grand Total:  {}", format_money(&calc.grand_total, locale));
    println!("  Round Off:    {}", format_money(&calc.rounding_adjustment, locale));
    println!("  Payable:      {}", bill.formatted_payable(locale));

    Ok(())
}
