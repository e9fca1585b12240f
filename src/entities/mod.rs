//! Entity type definitions
//!
//! - [`Part`] - a test article with its geometry tag and measured dimensions

pub mod part;

pub use part::Part;
