//! Raw collections as the document store hands them over
//!
//! Orders exist in two historical shapes: the line-item form written by the
//! billing screen and an older single-product form. Timestamps arrive either
//! as native values or as document-store `{seconds, nanoseconds}` objects.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::billing::Bill;
use crate::types::*;

/// Timestamp in any of the encodings found in stored records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    /// RFC 3339 timestamp
    Native(DateTime<Utc>),
    /// Document-store timestamp object exposing seconds and nanoseconds
    Document {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    /// Any other textual form (`2024-03-05 10:15:00`, `2024-03-05`)
    Text(String),
}

impl RawTimestamp {
    /// Coerce to an instant; `None` when the value cannot be read
    pub fn to_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(*millis),
            RawTimestamp::Native(instant) => Some(*instant),
            RawTimestamp::Document {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds),
            RawTimestamp::Text(text) => parse_text_timestamp(text),
        }
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        RawTimestamp::Native(instant)
    }
}

fn parse_text_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A line inside a line-item order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "whole_quantity")]
    pub quantity: i64,
    #[serde(default, alias = "price")]
    pub unit_price: Option<BigDecimal>,
    #[serde(default)]
    pub line_total: Option<BigDecimal>,
}

impl OrderLine {
    /// Revenue attributed to this line: the stored line total, else unit price × quantity
    pub fn revenue(&self) -> Option<BigDecimal> {
        self.line_total.clone().or_else(|| {
            self.unit_price
                .as_ref()
                .map(|price| price * BigDecimal::from(self.quantity))
        })
    }
}

/// Stored order totals; only the payable amount matters to analytics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    #[serde(default)]
    pub payable_amount: Option<BigDecimal>,
}

/// Quantity as found in stored records: integer, integral float or text
#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Whole(i64),
    Fractional(f64),
    Text(String),
}

impl RawQuantity {
    fn into_whole(self) -> Option<i64> {
        match self {
            RawQuantity::Whole(n) => Some(n),
            RawQuantity::Fractional(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
                Some(x as i64)
            }
            RawQuantity::Fractional(_) => None,
            RawQuantity::Text(text) => text.trim().parse().ok(),
        }
    }
}

fn whole_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    RawQuantity::deserialize(deserializer)?
        .into_whole()
        .ok_or_else(|| de::Error::custom("quantity is not a whole number"))
}

fn optional_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw = Option::<RawQuantity>::deserialize(deserializer)?;
    Ok(raw.and_then(|quantity| {
        let whole = quantity.into_whole();
        if whole.is_none() {
            warn!("legacy order quantity is not a whole number; treated as missing");
        }
        whole
    }))
}

/// One entry of `items[]`; entries that do not decode are dropped, not the order
#[derive(Deserialize)]
#[serde(untagged)]
enum LineSlot {
    Line(OrderLine),
    Unreadable(de::IgnoredAny),
}

fn readable_lines<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<OrderLine>, D::Error> {
    let slots = Vec::<LineSlot>::deserialize(deserializer)?;
    let total = slots.len();
    let lines: Vec<OrderLine> = slots
        .into_iter()
        .filter_map(|slot| match slot {
            LineSlot::Line(line) => Some(line),
            LineSlot::Unreadable(_) => None,
        })
        .collect();
    if lines.len() < total {
        warn!(skipped = total - lines.len(), "unreadable order lines skipped");
    }
    Ok(lines)
}

/// The two historical order shapes
///
/// `totals` lives on [`OrderRecord`] so it is read whichever shape matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderBody {
    LineItems {
        #[serde(deserialize_with = "readable_lines")]
        items: Vec<OrderLine>,
    },
    #[serde(rename_all = "camelCase")]
    Legacy {
        #[serde(default)]
        product_id: Option<String>,
        #[serde(default)]
        price: Option<BigDecimal>,
        #[serde(default, deserialize_with = "optional_quantity")]
        quantity: Option<i64>,
    },
}

/// An order as stored by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub created_at: Option<RawTimestamp>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub exhibition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<OrderTotals>,
    #[serde(flatten)]
    pub body: OrderBody,
}

impl OrderRecord {
    /// A line-item order with no metadata yet
    pub fn with_items(id: impl Into<String>, items: Vec<OrderLine>, payable_amount: Option<BigDecimal>) -> Self {
        let mut record = Self::bare(id, OrderBody::LineItems { items });
        record.totals = payable_amount.map(|amount| OrderTotals {
            payable_amount: Some(amount),
        });
        record
    }

    /// A single-product order in the legacy shape
    pub fn legacy(
        id: impl Into<String>,
        product_id: impl Into<String>,
        price: BigDecimal,
        quantity: i64,
    ) -> Self {
        Self::bare(
            id,
            OrderBody::Legacy {
                product_id: Some(product_id.into()),
                price: Some(price),
                quantity: Some(quantity),
            },
        )
    }

    /// Stored form of a bill once checkout completes
    pub fn from_bill(bill: &Bill, created_by: impl Into<String>, payment_method: impl Into<String>) -> Self {
        let items = bill
            .lines()
            .iter()
            .map(|line| OrderLine {
                product_id: Some(line.product_id.clone()),
                name: Some(line.name.clone()),
                category: Some(line.category),
                quantity: line.quantity,
                unit_price: Some(line.unit_price.clone()),
                line_total: Some(line.line_total.clone()),
            })
            .collect();

        let mut record = Self::with_items(bill.order_id(), items, Some(bill.payable_amount().clone()))
            .with_status(OrderStatus::Completed)
            .with_order_type(bill.order_type())
            .created_at(bill.issued_at())
            .created_by(created_by);
        record.payment_method = Some(payment_method.into());
        record.exhibition_id = bill.exhibition_id().map(str::to_string);
        record
    }

    fn bare(id: impl Into<String>, body: OrderBody) -> Self {
        Self {
            id: id.into(),
            status: None,
            order_type: None,
            created_at: None,
            created_by: None,
            payment_method: None,
            exhibition_id: None,
            totals: None,
            body,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    pub fn created_at(mut self, timestamp: impl Into<RawTimestamp>) -> Self {
        self.created_at = Some(timestamp.into());
        self
    }

    pub fn created_by(mut self, user_id: impl Into<String>) -> Self {
        self.created_by = Some(user_id.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(OrderStatus::Completed)
    }

    /// Order revenue: stored payable amount, else legacy price × quantity, else zero
    pub fn revenue(&self) -> BigDecimal {
        if let Some(amount) = self
            .totals
            .as_ref()
            .and_then(|totals| totals.payable_amount.as_ref())
        {
            return amount.clone();
        }
        match &self.body {
            OrderBody::Legacy {
                price: Some(price),
                quantity,
                ..
            } => price * BigDecimal::from(quantity.unwrap_or(0)),
            _ => BigDecimal::from(0),
        }
    }

    /// Units sold across the order
    pub fn items_sold(&self) -> i64 {
        match &self.body {
            OrderBody::LineItems { items } => items.iter().map(|item| item.quantity).sum(),
            OrderBody::Legacy { quantity, .. } => quantity.unwrap_or(0),
        }
    }
}

/// Catalogue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default)]
    pub stock_qty: u32,
    #[serde(default)]
    pub low_stock_threshold: u32,
}

fn default_category() -> Category {
    Category::Other
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        sku: impl Into<String>,
        category: Category,
        stock_qty: u32,
        low_stock_threshold: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sku: sku.into(),
            category,
            stock_qty,
            low_stock_threshold,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_qty <= self.low_stock_threshold
    }
}

/// Application user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
}

impl User {
    /// Name, else email, else `Unknown`
    pub fn display_name(&self) -> String {
        [&self.name, &self.email]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// The three collections analytics reduces over
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RetailData {
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub users: Vec<User>,
}
