//! Cart input for order calculation

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::tax::GstRate;
use crate::types::{Category, EngineError, EngineResult};
use crate::utils::validation::{validate_non_negative_amount, validate_percent};

/// A product line in the cart as the counter screen captured it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub category: Category,
    /// Units sold; must be positive
    pub quantity: i64,
    /// List price per unit
    pub base_price: BigDecimal,
    /// Markdown price, used only while `is_on_sale` is set
    #[serde(default)]
    pub sale_price: Option<BigDecimal>,
    /// GST rate as a whole percentage; must be one of the permitted slabs
    pub gst_rate: u32,
    /// Whether the unit price already contains GST
    #[serde(default)]
    pub is_tax_inclusive: bool,
    #[serde(default)]
    pub is_on_sale: bool,
    /// Per-line discount percentage (0-100) taken off the unit price
    #[serde(default)]
    pub line_discount_percent: Option<BigDecimal>,
}

impl CartItem {
    /// Create a tax-exclusive, full-price line
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        sku: impl Into<String>,
        category: Category,
        quantity: i64,
        base_price: BigDecimal,
        gst_rate: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            sku: sku.into(),
            category,
            quantity,
            base_price,
            sale_price: None,
            gst_rate,
            is_tax_inclusive: false,
            is_on_sale: false,
            line_discount_percent: None,
        }
    }

    /// Mark the price as GST-inclusive
    pub fn tax_inclusive(mut self) -> Self {
        self.is_tax_inclusive = true;
        self
    }

    /// Put the item on sale at `sale_price`
    pub fn on_sale(mut self, sale_price: BigDecimal) -> Self {
        self.is_on_sale = true;
        self.sale_price = Some(sale_price);
        self
    }

    pub fn with_line_discount(mut self, percent: BigDecimal) -> Self {
        self.line_discount_percent = Some(percent);
        self
    }

    /// Sale price when on sale and set, otherwise the base price
    pub fn effective_price(&self) -> &BigDecimal {
        match (&self.sale_price, self.is_on_sale) {
            (Some(sale_price), true) => sale_price,
            _ => &self.base_price,
        }
    }

    /// Effective price after the line discount
    pub fn unit_price(&self) -> EngineResult<BigDecimal> {
        let price = self.effective_price();
        validate_non_negative_amount(price, "effective unit price", EngineError::InvalidCart)?;
        match &self.line_discount_percent {
            Some(percent) => {
                validate_percent(percent, "lineDiscountPercent", EngineError::InvalidCart)?;
                let keep = BigDecimal::from(100) - percent;
                Ok((price * keep) / BigDecimal::from(100))
            }
            None => Ok(price.clone()),
        }
    }

    /// Validated GST slab
    pub fn gst_slab(&self) -> EngineResult<GstRate> {
        GstRate::try_from(self.gst_rate)
    }

    /// Structural checks run before any arithmetic
    pub fn validate(&self) -> EngineResult<()> {
        if self.quantity <= 0 {
            return Err(EngineError::InvalidCart(format!(
                "Quantity for '{}' must be positive, got {}",
                self.product_id, self.quantity
            )));
        }
        self.gst_slab()?;
        self.unit_price()?;
        Ok(())
    }
}

/// Items awaiting checkout plus the order-level employee discount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    /// Percentage (0-100) taken off the aggregate taxable base; absent means none
    #[serde(default)]
    pub employee_discount: Option<BigDecimal>,
}

impl Cart {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self {
            items,
            employee_discount: None,
        }
    }

    pub fn with_employee_discount(mut self, percent: BigDecimal) -> Self {
        self.employee_discount = Some(percent);
        self
    }

    /// Employee discount percentage, zero when absent
    pub fn discount_percent(&self) -> BigDecimal {
        self.employee_discount
            .clone()
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    /// Validate the cart before calculation
    pub fn validate(&self) -> EngineResult<()> {
        if self.items.is_empty() {
            return Err(EngineError::InvalidCart(
                "Cart must contain at least one item".to_string(),
            ));
        }

        validate_percent(
            &self.discount_percent(),
            "employeeDiscount",
            EngineError::InvalidCart,
        )?;

        for item in &self.items {
            item.validate()?;
        }

        Ok(())
    }
}
