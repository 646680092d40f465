//! Core enumerations and the error type shared by the billing and analytics engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product category as used across the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Men,
    Women,
    Kids,
    Accessories,
    /// Anything the catalogue does not classify, including unknown values
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Men => "men",
            Category::Women => "women",
            Category::Kids => "kids",
            Category::Accessories => "accessories",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "men" => Ok(Category::Men),
            "women" => Ok(Category::Women),
            "kids" => Ok(Category::Kids),
            "accessories" => Ok(Category::Accessories),
            "other" => Ok(Category::Other),
            other => Err(EngineError::InvalidFilter(format!(
                "Unknown category '{}'",
                other
            ))),
        }
    }
}

/// Sales channel an order was taken through
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Walk-in sale at the store counter
    Store,
    /// Sale at a pop-up exhibition
    Exhibition,
    /// Advance booking paid before the stock arrives
    Prebooking,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Store => "store",
            OrderType::Exhibition => "exhibition",
            OrderType::Prebooking => "prebooking",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "store" => Ok(OrderType::Store),
            "exhibition" => Ok(OrderType::Exhibition),
            "prebooking" => Ok(OrderType::Prebooking),
            other => Err(EngineError::InvalidFilter(format!(
                "Unknown order type '{}'",
                other
            ))),
        }
    }
}

/// Lifecycle state of a stored order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Access role of an application user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Employee,
}

/// Errors returned by the engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid cart: {0}")]
    InvalidCart(String),
    #[error("Invalid bill metadata: {0}")]
    InvalidBillMetadata(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Data source error: {0}")]
    Source(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
