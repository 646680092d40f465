//! Print-ready bill records

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::money::{format_money, Locale};
use crate::order::{CalculatedLine, OrderCalculation};
use crate::tax::GstRate;
use crate::types::*;
use crate::utils::validation::validate_required_text;

/// Buyer details printed on the bill
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Store identity printed in the bill header
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SellerInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// GST identification number
    pub gstin: String,
}

/// Caller-supplied details wrapped around a calculated order.
///
/// The issue timestamp is passed separately to [`generate_bill`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillMetadata {
    pub order_id: String,
    /// Sales channel name; must be `store`, `exhibition` or `prebooking`
    pub order_type: String,
    pub employee_id: String,
    pub employee_name: String,
    #[serde(default)]
    pub exhibition_id: Option<String>,
    pub customer: Customer,
}

impl BillMetadata {
    /// Validate and return the parsed order type
    pub fn validate(&self) -> EngineResult<OrderType> {
        validate_required_text(&self.order_id, "orderId", EngineError::InvalidBillMetadata)?;
        validate_required_text(
            &self.customer.name,
            "customer.name",
            EngineError::InvalidBillMetadata,
        )?;

        let order_type: OrderType = self.order_type.parse().map_err(|_| {
            EngineError::InvalidBillMetadata(format!("Unknown order type '{}'", self.order_type))
        })?;

        if order_type == OrderType::Exhibition
            && self
                .exhibition_id
                .as_deref()
                .map_or(true, |id| id.trim().is_empty())
        {
            return Err(EngineError::InvalidBillMetadata(
                "Exhibition orders must reference an exhibition".to_string(),
            ));
        }

        Ok(order_type)
    }
}

/// One row of the tax summary table, intra-state split included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSummary {
    pub rate: GstRate,
    pub taxable: BigDecimal,
    pub tax: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
}

/// Immutable invoice record.
///
/// Fields are private and there are no mutators; a bill is fixed once
/// [`generate_bill`] returns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    invoice_number: String,
    issued_at: DateTime<Utc>,
    #[serde(flatten)]
    metadata: BillMetadata,
    #[serde(skip)]
    order_type: OrderType,
    seller_info: SellerInfo,
    #[serde(flatten)]
    calculation: OrderCalculation,
    per_rate_summary: Vec<RateSummary>,
    total_cgst: BigDecimal,
    total_sgst: BigDecimal,
    item_count: i64,
}

impl Bill {
    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn order_id(&self) -> &str {
        &self.metadata.order_id
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn employee_id(&self) -> &str {
        &self.metadata.employee_id
    }

    pub fn employee_name(&self) -> &str {
        &self.metadata.employee_name
    }

    pub fn exhibition_id(&self) -> Option<&str> {
        self.metadata.exhibition_id.as_deref()
    }

    pub fn customer(&self) -> &Customer {
        &self.metadata.customer
    }

    pub fn seller_info(&self) -> &SellerInfo {
        &self.seller_info
    }

    pub fn calculation(&self) -> &OrderCalculation {
        &self.calculation
    }

    pub fn lines(&self) -> &[CalculatedLine] {
        &self.calculation.lines
    }

    /// Tax summary sorted by ascending rate
    pub fn per_rate_summary(&self) -> &[RateSummary] {
        &self.per_rate_summary
    }

    pub fn total_cgst(&self) -> &BigDecimal {
        &self.total_cgst
    }

    pub fn total_sgst(&self) -> &BigDecimal {
        &self.total_sgst
    }

    pub fn payable_amount(&self) -> &BigDecimal {
        &self.calculation.payable_amount
    }

    /// Units across all lines
    pub fn item_count(&self) -> i64 {
        self.item_count
    }

    pub fn formatted_payable(&self, locale: Locale) -> String {
        format_money(&self.calculation.payable_amount, locale)
    }
}

/// Build the bill for a calculated order.
///
/// Lines are copied verbatim from the calculation. Fails with
/// `InvalidBillMetadata` when the order type is unknown or the customer has
/// no name.
pub fn generate_bill(
    calculation: &OrderCalculation,
    metadata: &BillMetadata,
    seller_info: &SellerInfo,
    issued_at: DateTime<Utc>,
) -> EngineResult<Bill> {
    let order_type = metadata.validate()?;

    let per_rate_summary: Vec<RateSummary> = calculation
        .gst_breakdown
        .iter()
        .map(|(rate, bucket)| RateSummary {
            rate: *rate,
            taxable: bucket.taxable.clone(),
            tax: bucket.tax.clone(),
            cgst: bucket.cgst(),
            sgst: bucket.sgst(),
        })
        .collect();

    let total_cgst: BigDecimal = per_rate_summary.iter().map(|row| &row.cgst).sum();
    let total_sgst: BigDecimal = per_rate_summary.iter().map(|row| &row.sgst).sum();
    let invoice_number = invoice_number(&metadata.order_id, issued_at);

    debug!(
        invoice = %invoice_number,
        order_type = %order_type,
        payable = %calculation.payable_amount,
        "bill generated"
    );

    Ok(Bill {
        invoice_number,
        issued_at,
        metadata: metadata.clone(),
        order_type,
        seller_info: seller_info.clone(),
        calculation: calculation.clone(),
        per_rate_summary,
        total_cgst,
        total_sgst,
        item_count: calculation.item_count(),
    })
}

/// `INV-<yyyymmdd>-<ORDERID>` with the order id reduced to uppercase alphanumerics
pub fn invoice_number(order_id: &str, issued_at: DateTime<Utc>) -> String {
    let reference: String = order_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    format!("INV-{}-{}", issued_at.format("%Y%m%d"), reference)
}

/// Mint a fresh order identifier for a new checkout
pub fn new_order_id() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("ORD-{}", &id[..12])
}
