//! Validation utilities
//!
//! Each validator takes the error constructor to report with, so the same
//! check yields `InvalidCart` in checkout and `InvalidBillMetadata` in billing.

use bigdecimal::BigDecimal;

use crate::types::*;

/// Validate that a percentage lies in [0, 100]
pub fn validate_percent(
    value: &BigDecimal,
    field: &str,
    error: fn(String) -> EngineError,
) -> EngineResult<()> {
    if *value < BigDecimal::from(0) || *value > BigDecimal::from(100) {
        return Err(error(format!(
            "{} must be between 0 and 100, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Validate that an amount is not negative
pub fn validate_non_negative_amount(
    amount: &BigDecimal,
    field: &str,
    error: fn(String) -> EngineError,
) -> EngineResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(error(format!("{} cannot be negative, got {}", field, amount)))
    } else {
        Ok(())
    }
}

/// Validate that a text field has visible content
pub fn validate_required_text(
    value: &str,
    field: &str,
    error: fn(String) -> EngineError,
) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(error(format!("{} cannot be empty", field)));
    }
    Ok(())
}
