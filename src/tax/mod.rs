//! Tax computation

pub mod gst;

pub use gst::*;
