//! Cart model and order calculation

pub mod calculator;
pub mod cart;

pub use calculator::*;
pub use cart::*;
