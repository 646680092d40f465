//! # Retail Core
//!
//! Billing and analytics engine for a small GST-registered clothing retailer.
//!
//! ## Features
//!
//! - **GST normalization**: Tax-inclusive and tax-exclusive prices reduced to a common exclusive base
//! - **Order calculation**: Per-slab tax breakdown, employee discounts and whole-rupee payable rounding
//! - **Billing**: Immutable bill documents with CGST/SGST summaries and invoice numbers
//! - **Dashboard analytics**: Period metrics, growth, trends, top products, categories, employees and insights
//! - **Storage abstraction**: Collections are read through the [`RetailDataSource`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use retail_core::{calculate_order, format_money, Cart, CartItem, Category, Locale};
//! use bigdecimal::BigDecimal;
//!
//! let cart = Cart::new(vec![CartItem::new(
//!     "p1", "Cotton Kurta", "KUR-001", Category::Men, 2, BigDecimal::from(1000), 12,
//! )]);
//! let order = calculate_order(&cart).unwrap();
//! assert_eq!(format_money(&order.payable_amount, Locale::EnIn), "₹2,240.00");
//! ```

pub mod analytics;
pub mod billing;
pub mod config;
pub mod dashboard;
pub mod money;
pub mod order;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use analytics::*;
pub use billing::*;
pub use config::EngineConfig;
pub use dashboard::Dashboard;
pub use money::{format_money, round_money, Locale};
pub use order::*;
pub use tax::*;
pub use traits::*;
pub use types::*;
pub use utils::MemoryDataSource;
