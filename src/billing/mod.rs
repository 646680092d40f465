//! Bill construction

pub mod bill;

pub use bill::*;
