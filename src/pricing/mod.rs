//! Multi-model comparison
//!
//! Runs the closed-form, lattice and simulation pricers side by side and pairs
//! their output with the listed market quote.

pub mod comparator;

pub use comparator::*;
