//! GST (Goods and Services Tax) engine for retail line items
//!
//! Splits a unit price into its exclusive base and tax, and aggregates
//! calculated lines into per-rate buckets. Nothing here rounds; callers round
//! terminal totals only.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::order::{CalculatedLine, CartItem};
use crate::types::{EngineError, EngineResult};

/// GST slabs permitted on apparel and accessories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum GstRate {
    /// Exempt goods - 0%
    Exempt,
    /// 5%
    Five,
    /// 12%
    Twelve,
    /// 18%
    Eighteen,
    /// 28%
    TwentyEight,
}

impl GstRate {
    /// All slabs in ascending order
    pub const ALL: [GstRate; 5] = [
        GstRate::Exempt,
        GstRate::Five,
        GstRate::Twelve,
        GstRate::Eighteen,
        GstRate::TwentyEight,
    ];

    /// Rate as a whole percentage (e.g. 12)
    pub fn percent(&self) -> u32 {
        match self {
            GstRate::Exempt => 0,
            GstRate::Five => 5,
            GstRate::Twelve => 12,
            GstRate::Eighteen => 18,
            GstRate::TwentyEight => 28,
        }
    }

    /// Rate as a fraction (e.g. 0.12)
    pub fn fraction(&self) -> BigDecimal {
        BigDecimal::from(self.percent()) / BigDecimal::from(100)
    }
}

impl TryFrom<u32> for GstRate {
    type Error = EngineError;

    fn try_from(percent: u32) -> Result<Self, Self::Error> {
        GstRate::ALL
            .into_iter()
            .find(|rate| rate.percent() == percent)
            .ok_or_else(|| {
                EngineError::InvalidCart(format!(
                    "GST rate {}% is not one of 0, 5, 12, 18, 28",
                    percent
                ))
            })
    }
}

impl From<GstRate> for u32 {
    fn from(rate: GstRate) -> Self {
        rate.percent()
    }
}

impl fmt::Display for GstRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Exclusive price and tax for a single unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitBreakdown {
    pub unit_exclusive: BigDecimal,
    pub unit_tax: BigDecimal,
}

/// Split a unit price at the given rate.
///
/// Tax-inclusive prices are divided by `1 + r`; exclusive prices are taxed
/// on top.
pub fn split_unit_price(price: &BigDecimal, rate: GstRate, tax_inclusive: bool) -> UnitBreakdown {
    let r = rate.fraction();
    if tax_inclusive {
        let unit_exclusive = price / (BigDecimal::from(1) + r);
        let unit_tax = price - &unit_exclusive;
        UnitBreakdown {
            unit_exclusive,
            unit_tax,
        }
    } else {
        UnitBreakdown {
            unit_tax: price * r,
            unit_exclusive: price.clone(),
        }
    }
}

/// Normalize a cart item's effective unit price into exclusive base and tax
pub fn normalize_unit(item: &CartItem) -> EngineResult<UnitBreakdown> {
    let rate = item.gst_slab()?;
    let price = item.unit_price()?;
    Ok(split_unit_price(&price, rate, item.is_tax_inclusive))
}

/// Taxable base and tax collected at one rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBucket {
    pub taxable: BigDecimal,
    pub tax: BigDecimal,
}

impl RateBucket {
    pub fn zero() -> Self {
        Self {
            taxable: BigDecimal::from(0),
            tax: BigDecimal::from(0),
        }
    }

    /// Central share of an intra-state levy (half the tax)
    pub fn cgst(&self) -> BigDecimal {
        &self.tax / BigDecimal::from(2)
    }

    /// State share of an intra-state levy (half the tax)
    pub fn sgst(&self) -> BigDecimal {
        &self.tax - self.cgst()
    }
}

/// Per-rate aggregation, ordered by ascending rate
pub type GstBreakdown = BTreeMap<GstRate, RateBucket>;

/// Group lines by rate, summing taxable base and tax.
///
/// Only rates that occur in `lines` get a key.
pub fn aggregate_by_rate(lines: &[CalculatedLine]) -> GstBreakdown {
    let mut breakdown = GstBreakdown::new();
    for line in lines {
        let bucket = breakdown.entry(line.gst_rate).or_insert_with(RateBucket::zero);
        bucket.taxable += &line.line_taxable_base;
        bucket.tax += &line.line_tax;
    }
    breakdown
}
