//! Order calculation: drives the GST engine across a cart and assembles totals

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::money::{percent_of, round_money};
use crate::order::{Cart, CartItem};
use crate::tax::{aggregate_by_rate, normalize_unit, GstBreakdown, GstRate, RateBucket};
use crate::types::*;

/// A cart line after tax normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedLine {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub category: Category,
    pub quantity: i64,
    pub gst_rate: GstRate,
    pub is_tax_inclusive: bool,
    /// Price charged per unit after sale price and line discount, as entered
    pub unit_price: BigDecimal,
    pub unit_price_exclusive: BigDecimal,
    pub unit_tax: BigDecimal,
    /// `unit_price_exclusive × quantity`
    pub line_taxable_base: BigDecimal,
    pub line_tax: BigDecimal,
    /// `line_taxable_base + line_tax`
    pub line_total: BigDecimal,
}

impl CalculatedLine {
    /// Normalize one cart item into a calculated line
    pub fn from_item(item: &CartItem) -> EngineResult<Self> {
        item.validate()?;
        let unit = normalize_unit(item)?;
        let quantity = BigDecimal::from(item.quantity);
        let line_taxable_base = &unit.unit_exclusive * &quantity;
        let line_tax = &unit.unit_tax * &quantity;
        let line_total = &line_taxable_base + &line_tax;

        Ok(Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            sku: item.sku.clone(),
            category: item.category,
            quantity: item.quantity,
            gst_rate: item.gst_slab()?,
            is_tax_inclusive: item.is_tax_inclusive,
            unit_price: item.unit_price()?,
            unit_price_exclusive: unit.unit_exclusive,
            unit_tax: unit.unit_tax,
            line_taxable_base,
            line_tax,
            line_total,
        })
    }
}

/// Canonical monetary breakdown of a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCalculation {
    pub lines: Vec<CalculatedLine>,
    /// Sum of line taxable bases before the employee discount
    pub subtotal_exclusive: BigDecimal,
    /// Employee discount percentage that was applied
    pub discount_percent: BigDecimal,
    pub discount_amount: BigDecimal,
    pub taxable_after_discount: BigDecimal,
    /// Post-discount taxable base and tax per rate
    pub gst_breakdown: GstBreakdown,
    pub total_tax: BigDecimal,
    /// `taxable_after_discount + total_tax`, unrounded
    pub grand_total: BigDecimal,
    /// `payable_amount - grand_total`
    pub rounding_adjustment: BigDecimal,
    /// Grand total rounded half away from zero to whole currency units
    pub payable_amount: BigDecimal,
}

impl OrderCalculation {
    /// Total units across all lines
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

/// Calculate the full order breakdown for a cart.
///
/// The employee discount scales every rate bucket's taxable base by
/// `1 - d/100` and recomputes each bucket's tax from the scaled base, so the
/// per-rate taxes always sum to `total_tax`.
pub fn calculate_order(cart: &Cart) -> EngineResult<OrderCalculation> {
    cart.validate()?;

    let lines = cart
        .items
        .iter()
        .map(CalculatedLine::from_item)
        .collect::<EngineResult<Vec<_>>>()?;

    let subtotal_exclusive: BigDecimal = lines.iter().map(|line| &line.line_taxable_base).sum();

    let discount_percent = cart.discount_percent();
    let discount_amount = percent_of(&subtotal_exclusive, &discount_percent);
    let keep_factor =
        BigDecimal::from(1) - (&discount_percent / BigDecimal::from(100));

    let gst_breakdown: GstBreakdown = aggregate_by_rate(&lines)
        .into_iter()
        .map(|(rate, bucket)| {
            let taxable = &bucket.taxable * &keep_factor;
            let tax = &taxable * rate.fraction();
            (rate, RateBucket { taxable, tax })
        })
        .collect();

    let taxable_after_discount: BigDecimal =
        gst_breakdown.values().map(|bucket| &bucket.taxable).sum();
    let total_tax: BigDecimal = gst_breakdown.values().map(|bucket| &bucket.tax).sum();
    let grand_total = &taxable_after_discount + &total_tax;
    let payable_amount = round_money(&grand_total, 0);
    let rounding_adjustment = &payable_amount - &grand_total;

    debug!(
        lines = lines.len(),
        rates = gst_breakdown.len(),
        subtotal = %subtotal_exclusive,
        discount = %discount_amount,
        total_tax = %total_tax,
        payable = %payable_amount,
        "order calculated"
    );

    Ok(OrderCalculation {
        lines,
        subtotal_exclusive,
        discount_percent,
        discount_amount,
        taxable_after_discount,
        gst_breakdown,
        total_tax,
        grand_total,
        rounding_adjustment,
        payable_amount,
    })
}
