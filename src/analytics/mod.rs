//! Dashboard analytics: raw records, filter windows, reduction and insights

pub mod insights;
pub mod records;
pub mod reducer;
pub mod window;

pub use insights::*;
pub use records::*;
pub use reducer::*;
pub use window::*;
