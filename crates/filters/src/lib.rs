#![forbid(unsafe_code)]

pub mod range;

pub use range::range_filter;
